mod common;

use common::{cell, data, edge_payload, node_payload, prop, reply, stats_only, FakeServer, Schema};
use redgraph::{Edge, EdgeId, EdgeQuery, GraphError, Node, NodeId, Result, Value};
use redis::Value as Frame;

fn persisted(id: u64, label: &str, name: &str) -> Node {
    let mut node = Node::new(label).with_property("name", name);
    node.id = Some(NodeId(id));
    node
}

#[test]
fn add_edge_between_persisted_nodes() -> Result<()> {
    let server = FakeServer::new(Schema::movies());
    server.on(
        "RETURN ID(edge)",
        reply(
            &["ID(edge)"],
            vec![vec![cell(3, Frame::Int(5))]],
            &["Relationships created: 1", "Properties set: 1"],
        ),
    );
    let graph = server.graph();
    let actor = persisted(0, "actor", "Al Pacino");
    let film = persisted(1, "film", "Scarface");

    let mut edge = Edge::new("ACTOR_IN", &actor, &film).with_property("role", "Tony Montana");
    assert_eq!(graph.add_edge(&mut edge)?, Some(EdgeId(5)));
    assert_eq!(edge.id, Some(EdgeId(5)));
    assert_eq!(
        server.last_query("CREATE"),
        r#"MATCH (src), (dest) WHERE ID(src) = 0 AND ID(dest) = 1 CREATE (src)-[edge:`ACTOR_IN` {role:"Tony Montana"}]->(dest) RETURN ID(edge)"#
    );
    Ok(())
}

#[test]
fn merge_of_existing_edge_returns_none() -> Result<()> {
    let server = FakeServer::new(Schema::movies());
    server.on(
        "MERGE",
        reply(&["ID(edge)"], vec![vec![cell(3, Frame::Int(5))]], &[]),
    );
    let graph = server.graph();
    let actor = persisted(0, "actor", "Al Pacino");
    let film = persisted(1, "film", "Scarface");
    let mut edge = Edge::new("ACTOR_IN", &actor, &film);
    assert_eq!(graph.merge_edge(&mut edge)?, None);
    assert_eq!(edge.id, None);
    Ok(())
}

#[test]
fn unpersisted_endpoints_are_rejected() {
    let server = FakeServer::new(Schema::movies());
    let graph = server.graph();
    let actor = Node::new("actor");
    let film = persisted(1, "film", "Scarface");
    let mut edge = Edge::new("ACTOR_IN", &actor, &film);
    assert!(matches!(
        graph.add_edge(&mut edge),
        Err(GraphError::Invalid(_))
    ));
    assert_eq!(server.transport.count_matching("CREATE"), 0);
}

#[test]
fn listing_attaches_endpoints() -> Result<()> {
    let server = FakeServer::new(Schema::movies());
    server.on(
        "RETURN src, edge, dest",
        reply(
            &["src", "edge", "dest"],
            vec![vec![
                cell(8, node_payload(0, &[0], vec![prop(0, 2, data("Al Pacino"))])),
                cell(7, edge_payload(2, 1, 0, 3, vec![prop(3, 3, Frame::Int(1983))])),
                cell(8, node_payload(3, &[0], vec![prop(0, 2, data("Steven Bauer"))])),
            ]],
            &[],
        ),
    );
    server.on(
        "COUNT(edge)",
        reply(&["COUNT(edge)"], vec![vec![cell(3, Frame::Int(1))]], &[]),
    );
    let graph = server.graph();
    let al = persisted(0, "actor", "Al Pacino");

    let filter = EdgeQuery::new()
        .relationship_type("FRIEND_OF")
        .src(&al)
        .order("edge.since DESC");
    let edges = graph.edges(&filter)?;
    assert_eq!(edges.len(), 1);
    let edge = &edges[0];
    assert_eq!(edge.relationship_type(), Some("FRIEND_OF"));
    assert_eq!(edge.properties.get("since"), Some(&Value::Int(1983)));
    let src = edge.src.as_deref().expect("source attached");
    let dest = edge.dest.as_deref().expect("destination attached");
    assert_eq!(src, &al);
    assert_eq!(dest.properties.get("name"), Some(&Value::from("Steven Bauer")));
    assert_eq!(edge.dest_id(), Some(NodeId(3)));
    assert_eq!(
        server.last_query("RETURN src"),
        "MATCH (src)-[edge:`FRIEND_OF`]->(dest) WHERE ID(src) = 0 RETURN src, edge, dest ORDER BY edge.since DESC"
    );

    assert_eq!(graph.count_edges(&filter)?, 1);
    assert!(matches!(
        graph.edges(&EdgeQuery::new().order("since")),
        Err(GraphError::MissingAliasPrefix { alias: "edge", .. })
    ));
    Ok(())
}

#[test]
fn deleting_relationships_is_reported() -> Result<()> {
    let server = FakeServer::new(Schema::movies());
    server.on("DELETE edge", stats_only(&["Relationships deleted: 2"]));
    let graph = server.graph();
    let response = graph.execute("MATCH ()-[edge]->() DELETE edge")?;
    assert_eq!(response.stats().relationships_deleted, Some(2));
    Ok(())
}

#[test]
fn negative_edge_count_is_malformed() {
    let server = FakeServer::new(Schema::movies());
    server.on(
        "COUNT(edge)",
        reply(&["COUNT(edge)"], vec![vec![cell(3, Frame::Int(-3))]], &[]),
    );
    let graph = server.graph();
    assert!(matches!(
        graph.count_edges(&EdgeQuery::new()),
        Err(GraphError::MalformedReply(_))
    ));
}

#[test]
fn edge_listing_without_edge_column_is_malformed() {
    let server = FakeServer::new(Schema::movies());
    server.on(
        "RETURN src, edge, dest",
        reply(
            &["src", "other", "dest"],
            vec![vec![
                cell(8, node_payload(0, &[0], vec![])),
                cell(3, Frame::Int(1)),
                cell(8, node_payload(1, &[1], vec![])),
            ]],
            &[],
        ),
    );
    let graph = server.graph();
    assert!(matches!(
        graph.edges(&EdgeQuery::new()),
        Err(GraphError::MalformedReply(_))
    ));
}
