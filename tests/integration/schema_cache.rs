mod common;

use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use common::{cell, data, node_payload, prop, reply, FakeServer, Schema};
use redgraph::{
    GraphError, LabelId, Result, SchemaCache, SchemaKind, SchemaSource, Value,
};

struct Lists {
    labels: RefCell<Vec<&'static str>>,
    fetches: RefCell<usize>,
    fail: bool,
}

impl Lists {
    fn new(labels: &[&'static str]) -> Self {
        Self {
            labels: RefCell::new(labels.to_vec()),
            fetches: RefCell::new(0),
            fail: false,
        }
    }
}

impl SchemaSource for Lists {
    fn fetch_schema(&self, kind: SchemaKind) -> Result<Vec<String>> {
        assert_eq!(kind, SchemaKind::Label);
        *self.fetches.borrow_mut() += 1;
        if self.fail {
            return Err(GraphError::Invalid("connection dropped"));
        }
        Ok(self.labels.borrow().iter().map(|s| s.to_string()).collect())
    }
}

#[test]
fn miss_triggers_exactly_one_refetch() -> Result<()> {
    let source = Lists::new(&["actor"]);
    let cache = SchemaCache::new();
    assert_eq!(cache.label(&source, LabelId(0))?.as_deref(), Some("actor"));
    assert_eq!(*source.fetches.borrow(), 1);

    source.labels.borrow_mut().push("film");
    assert_eq!(cache.label(&source, LabelId(1))?.as_deref(), Some("film"));
    assert_eq!(*source.fetches.borrow(), 2);

    assert_eq!(cache.label(&source, LabelId(7))?, None);
    assert_eq!(*source.fetches.borrow(), 3, "unknown id refetches once");

    let metrics = cache.metrics_snapshot();
    assert_eq!(metrics.resolve_calls, 3);
    assert_eq!(metrics.resolve_hits, 1);
    assert_eq!(metrics.resolve_misses, 2);
    assert_eq!(metrics.unresolved, 1);
    Ok(())
}

struct Growing {
    calls: RefCell<usize>,
}

impl SchemaSource for Growing {
    fn fetch_schema(&self, _kind: SchemaKind) -> Result<Vec<String>> {
        *self.calls.borrow_mut() += 1;
        let names: &[&str] = if *self.calls.borrow() == 1 {
            &["actor"]
        } else {
            &["actor", "film"]
        };
        Ok(names.iter().map(|s| s.to_string()).collect())
    }
}

#[test]
fn miss_on_the_first_lookup_refetches() -> Result<()> {
    let source = Growing {
        calls: RefCell::new(0),
    };
    let cache = SchemaCache::new();
    assert_eq!(cache.label(&source, LabelId(1))?.as_deref(), Some("film"));
    assert_eq!(*source.calls.borrow(), 2);
    let metrics = cache.metrics_snapshot();
    assert_eq!(metrics.fetches, 2);
    assert_eq!(metrics.resolve_misses, 1);
    assert_eq!(metrics.unresolved, 0);
    Ok(())
}

struct SlowLabels {
    fetches: AtomicUsize,
}

impl SchemaSource for SlowLabels {
    fn fetch_schema(&self, _kind: SchemaKind) -> Result<Vec<String>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        Ok(vec!["actor".to_string(), "film".to_string()])
    }
}

#[test]
fn concurrent_cold_lookups_fetch_once() {
    let source = SlowLabels {
        fetches: AtomicUsize::new(0),
    };
    let cache = SchemaCache::new();
    thread::scope(|scope| {
        for i in 0..8u32 {
            let (cache, source) = (&cache, &source);
            scope.spawn(move || {
                let name = cache.label(source, LabelId(i % 2)).unwrap();
                let expected = if i % 2 == 0 { "actor" } else { "film" };
                assert_eq!(name.as_deref(), Some(expected));
            });
        }
    });
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    let metrics = cache.metrics_snapshot();
    assert_eq!(metrics.fetches, 1);
    assert_eq!(metrics.resolve_calls, 8);
    assert_eq!(metrics.resolve_hits, 8);
}

#[test]
fn fetch_failure_propagates_with_kind() {
    let mut source = Lists::new(&["actor"]);
    source.fail = true;
    let cache = SchemaCache::new();
    let err = cache.label(&source, LabelId(0)).unwrap_err();
    assert!(matches!(
        err,
        GraphError::SchemaFetch {
            kind: SchemaKind::Label,
            ..
        }
    ));
    assert_eq!(cache.cached(SchemaKind::Label), None);
}

#[test]
fn graph_refetches_labels_added_by_other_writers() -> Result<()> {
    let server = FakeServer::new(Schema {
        labels: vec!["actor".into()],
        properties: vec!["name".into()],
        relationship_types: Vec::new(),
    });
    server.on(
        "RETURN a",
        reply(
            &["a"],
            vec![vec![cell(8, node_payload(0, &[0], vec![prop(0, 2, data("Al"))]))]],
            &[],
        ),
    );
    server.on(
        "RETURN f",
        reply(&["f"], vec![vec![cell(8, node_payload(1, &[1], vec![]))]], &[]),
    );
    let graph = server.graph();

    let rows = graph.query("MATCH (a:actor) RETURN a")?;
    let actor = rows[0][0].as_node().expect("node");
    assert_eq!(actor.labels(), ["actor"]);
    assert_eq!(actor.properties.get("name"), Some(&Value::from("Al")));
    assert_eq!(server.transport.count_matching("db.labels"), 1);

    server.schema.lock().labels.push("film".into());
    let rows = graph.query("MATCH (f:film) RETURN f")?;
    assert_eq!(rows[0][0].as_node().and_then(|n| n.label()), Some("film"));
    assert_eq!(server.transport.count_matching("db.labels"), 2);
    assert_eq!(server.transport.count_matching("db.propertyKeys"), 1);
    Ok(())
}

#[test]
fn caches_are_per_connection() -> Result<()> {
    let first = FakeServer::new(Schema::movies());
    let second = FakeServer::new(Schema {
        labels: vec!["person".into()],
        ..Schema::default()
    });
    let payload = reply(&["n"], vec![vec![cell(8, node_payload(3, &[0], vec![]))]], &[]);
    first.on("RETURN n", payload.clone());
    second.on("RETURN n", payload);

    let a = first.graph().query("MATCH (n) RETURN n")?;
    let b = second.graph().query("MATCH (n) RETURN n")?;
    assert_eq!(a[0][0].as_node().and_then(|n| n.label()), Some("actor"));
    assert_eq!(b[0][0].as_node().and_then(|n| n.label()), Some("person"));
    Ok(())
}

#[test]
fn explicit_listing_always_refetches() -> Result<()> {
    let server = FakeServer::new(Schema::movies());
    let graph = server.graph();
    assert_eq!(graph.labels()?, ["actor", "film"]);
    assert_eq!(graph.labels()?, ["actor", "film"]);
    assert_eq!(server.transport.count_matching("db.labels"), 2);
    assert_eq!(graph.relationship_types()?, ["ACTOR_IN", "FRIEND_OF"]);
    assert_eq!(graph.properties()?.len(), 5);
    assert_eq!(
        graph.schema().cached(SchemaKind::Property).map(|p| p.len()),
        Some(5)
    );

    graph.delete()?;
    for kind in SchemaKind::ALL {
        assert_eq!(graph.schema().cached(kind), None);
    }
    Ok(())
}
