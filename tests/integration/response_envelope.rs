mod common;

use common::{cell, data, edge_payload, node_payload, prop, reply, stats_only, FakeServer, Schema};
use redgraph::{EdgeId, GraphError, NodeId, Result, Value, ValueType};
use redis::Value as Frame;

#[test]
fn columns_align_with_reified_entities() -> Result<()> {
    let server = FakeServer::new(Schema::movies());
    server.on(
        "RETURN node, edge",
        reply(
            &["node", "edge"],
            vec![vec![
                cell(8, node_payload(0, &[0], vec![prop(0, 2, data("Al Pacino"))])),
                cell(7, edge_payload(0, 0, 0, 1, vec![prop(4, 2, data("Tony"))])),
            ]],
            &["Query internal execution time: 0.5 ms"],
        ),
    );
    let graph = server.graph();
    let response = graph.execute("MATCH (node)-[edge]->() RETURN node, edge")?;

    assert_eq!(response.columns(), ["node", "edge"]);
    let records = response.result_set()?;
    assert_eq!(records.len(), 1);
    let node = records[0].get("node").and_then(Value::as_node).expect("node");
    let edge = records[0].get("edge").and_then(Value::as_edge).expect("edge");
    assert_eq!(node.id, Some(NodeId(0)));
    assert_eq!(node.properties.get("name"), Some(&Value::from("Al Pacino")));
    assert_eq!(edge.id, Some(EdgeId(0)));
    assert_eq!(edge.relationship_type(), Some("ACTOR_IN"));
    assert_eq!(edge.properties.get("role"), Some(&Value::from("Tony")));

    let rows = response.rows()?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].len(), 2);
    assert_eq!(rows[0][0].as_node(), Some(node));
    assert_eq!(rows[0][1].as_edge().and_then(|e| e.dest_id()), Some(NodeId(1)));

    assert_eq!(
        response.stats().internal_execution_time.as_deref(),
        Some("0.5 ms")
    );
    assert_eq!(response.stats().nodes_created, None);
    Ok(())
}

#[test]
fn derived_views_are_memoized() -> Result<()> {
    let server = FakeServer::new(Schema::movies());
    server.on(
        "RETURN x",
        reply(&["x"], vec![vec![cell(3, Frame::Int(1))]], &["Nodes created: 0"]),
    );
    let graph = server.graph();
    let response = graph.execute("RETURN x")?;
    assert!(std::ptr::eq(response.rows()?, response.rows()?));
    assert!(std::ptr::eq(response.result_set()?, response.result_set()?));
    assert!(std::ptr::eq(response.stats(), response.stats()));
    assert!(std::ptr::eq(response.columns(), response.columns()));
    Ok(())
}

#[test]
fn scalar_arrays_and_unsupported_cells() -> Result<()> {
    let server = FakeServer::new(Schema::movies());
    let numbers = Frame::Bulk(vec![
        cell(3, Frame::Int(1)),
        cell(3, Frame::Int(2)),
        cell(3, Frame::Int(3)),
    ]);
    server.on(
        "RETURN mixed",
        reply(
            &["list", "flag", "ratio", "nothing", "path", "point"],
            vec![vec![
                cell(6, numbers),
                cell(4, data("true")),
                cell(5, data("0.25")),
                cell(1, Frame::Nil),
                cell(9, Frame::Bulk(vec![])),
                cell(11, Frame::Bulk(vec![data("1.0"), data("2.0")])),
            ]],
            &[],
        ),
    );
    let graph = server.graph();
    let rows = graph.query("RETURN mixed")?;
    assert_eq!(
        rows[0],
        vec![
            Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
            Value::Bool(true),
            Value::Double(0.25),
            Value::Null,
            Value::Unsupported(ValueType::Path),
            Value::Unsupported(ValueType::Point),
        ]
    );
    Ok(())
}

#[test]
fn tags_outside_the_enumeration_fail() {
    let server = FakeServer::new(Schema::movies());
    server.on(
        "RETURN odd",
        reply(&["odd"], vec![vec![cell(42, Frame::Int(0))]], &[]),
    );
    let graph = server.graph();
    let err = graph.query("RETURN odd").unwrap_err();
    assert!(matches!(err, GraphError::UnknownValueType(42)));
}

#[test]
fn statistics_only_reply() -> Result<()> {
    let server = FakeServer::new(Schema::movies());
    server.on(
        "CREATE",
        stats_only(&[
            "Nodes created: 3",
            "Properties set: 5",
            "Query internal execution time: 0.123 ms",
        ]),
    );
    let graph = server.graph();
    let response = graph.execute("CREATE (:a), (:b), (:c)")?;
    assert!(response.columns().is_empty());
    assert!(response.rows()?.is_empty());
    assert!(response.result_set()?.is_empty());
    let stats = response.stats();
    assert_eq!(stats.nodes_created, Some(3));
    assert_eq!(stats.properties_set, Some(5));
    assert_eq!(stats.internal_execution_time.as_deref(), Some("0.123 ms"));
    assert_eq!(stats.relationships_created, None);
    assert_eq!(
        serde_json::to_value(stats).expect("serializable"),
        serde_json::json!({
            "nodes_created": 3,
            "properties_set": 5,
            "internal_execution_time": "0.123 ms",
        })
    );
    Ok(())
}

#[test]
fn server_errors_surface_as_transport_errors() {
    let server = FakeServer::new(Schema::movies());
    let graph = server.graph();
    assert!(matches!(
        graph.execute("MATCH (n) RETURN n"),
        Err(GraphError::Redis(_))
    ));
}
