//! Exercises a real server. Skipped unless `TEST_REDIS_URL` points at one with
//! the graph module loaded.

use redgraph::{ClientConfig, Edge, EdgeQuery, Graph, Node, NodeQuery, Result, Value};

fn live_graph(name: &str) -> Option<Graph> {
    let url = std::env::var("TEST_REDIS_URL").ok()?;
    let mut config = ClientConfig::with_url(url);
    config.read_timeout_ms = Some(5_000);
    let graph = Graph::open(name, &config).expect("connect to TEST_REDIS_URL");
    let _ = graph.delete();
    Some(graph)
}

#[test]
fn node_roundtrip_through_server() -> Result<()> {
    let Some(graph) = live_graph("redgraph_live_nodes") else {
        eprintln!("TEST_REDIS_URL not set; skipping");
        return Ok(());
    };

    let mut actor = Node::new("actor")
        .with_property("name", "Al Pacino")
        .with_property("age", 78)
        .with_property("height", 1.7)
        .with_property("active", true);
    let id = graph.add_node(&mut actor)?;
    let found = graph.find_node_by_id(id)?.expect("stored node");
    assert_eq!(found.labels(), ["actor"]);
    assert_eq!(found.properties, actor.properties);

    assert_eq!(graph.count_nodes(&NodeQuery::new().label("actor"))?, 1);
    assert!(graph.labels()?.contains(&"actor".to_string()));

    let mut older = found.clone();
    older.properties.insert("age", 79);
    let updated = graph.update_node(&older)?.expect("updated");
    assert_eq!(updated.properties.get("age"), Some(&Value::Int(79)));

    assert!(graph.destroy_node(&updated)?);
    assert_eq!(graph.find_node_by_id(id)?, None);
    graph.delete()
}

#[test]
fn edges_through_server() -> Result<()> {
    let Some(graph) = live_graph("redgraph_live_edges") else {
        eprintln!("TEST_REDIS_URL not set; skipping");
        return Ok(());
    };

    let mut al = Node::new("actor").with_property("name", "Al Pacino");
    let mut film = Node::new("film").with_property("title", "Scarface");
    graph.add_node(&mut al)?;
    graph.add_node(&mut film)?;

    let mut edge = Edge::new("ACTOR_IN", &al, &film).with_property("role", "Tony");
    assert!(graph.add_edge(&mut edge)?.is_some());

    let edges = graph.edges(&EdgeQuery::new().relationship_type("ACTOR_IN").src(&al))?;
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].properties.get("role"), Some(&Value::from("Tony")));
    assert_eq!(edges[0].dest_id(), film.id);
    assert_eq!(graph.count_edges(&EdgeQuery::new())?, 1);

    let rows = graph.query("MATCH (a)-[r]->(f) RETURN a, r, f, [1, 2, 3]")?;
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0][3],
        Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
    graph.delete()
}
