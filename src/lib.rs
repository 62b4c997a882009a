//! Client for the RedisGraph module speaking the compact reply protocol.
//!
//! Compact replies encode labels, property keys, and relationship types as
//! integer ids. A [`Graph`] handle keeps a per-connection [`SchemaCache`] that
//! resolves those ids lazily, and hands out [`QueryResponse`] envelopes whose
//! rows decode into [`Value`], [`Node`], and [`Edge`].
//!
//! ```no_run
//! use redgraph::{ClientConfig, Graph, Node};
//!
//! # fn main() -> redgraph::Result<()> {
//! let graph = Graph::open("movies", &ClientConfig::default())?;
//! let mut actor = Node::new("actor").with_property("name", "Al Pacino");
//! graph.add_node(&mut actor)?;
//! for row in graph.query("MATCH (a:actor) RETURN a.name")? {
//!     println!("{}", row[0]);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Client configuration file handling.
pub mod config;
/// Reply cell decoding and entity reification.
pub mod decode;
/// The graph handle and its node/edge operations.
pub mod graph;
/// Typed values, nodes, and edges.
pub mod model;
/// Wire tags and frame accessors for the compact protocol.
pub mod protocol;
/// Cypher literal escaping and listing filters.
pub mod query;
/// Reply envelope, statistics, and records.
pub mod response;
/// Schema id caches.
pub mod schema;
/// Command transports.
pub mod transport;
/// Identifier newtypes and errors.
pub mod types;

pub use config::{ClientConfig, ConfigError};
pub use decode::Decoder;
pub use graph::Graph;
pub use model::{Edge, Node, NodeBuilder, Properties, Value};
pub use protocol::ValueType;
pub use query::{EdgeQuery, NodeQuery};
pub use response::{QueryResponse, QueryStats, Record};
pub use schema::{SchemaCache, SchemaKind, SchemaMetricsSnapshot, SchemaSource};
pub use transport::{RedisTransport, ScriptedTransport, Transport};
pub use types::{EdgeId, GraphError, LabelId, NodeId, PropId, Result, TypeId};
