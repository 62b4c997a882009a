use std::fmt;

use serde::Serialize;

use crate::model::node::write_properties;
use crate::model::{Node, Properties, Value};
use crate::types::{EdgeId, NodeId};

/// A directed, typed relationship between two nodes.
///
/// An edge reified on its own carries only raw endpoint ids; queries that also
/// project the endpoints attach the materialized nodes.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Edge {
    /// Server id, set once the edge is persisted.
    pub id: Option<EdgeId>,
    /// Relationship type. `None` in match patterns that accept any type, or when
    /// the type id could not be resolved.
    pub relationship_type: Option<String>,
    /// Materialized source node.
    pub src: Option<Box<Node>>,
    /// Raw source node id.
    pub src_id: Option<NodeId>,
    /// Materialized destination node.
    pub dest: Option<Box<Node>>,
    /// Raw destination node id.
    pub dest_id: Option<NodeId>,
    /// Property map.
    pub properties: Properties,
}

impl Edge {
    /// Creates an unpersisted edge between two nodes.
    pub fn new(relationship_type: impl Into<String>, src: &Node, dest: &Node) -> Self {
        let mut edge = Edge {
            relationship_type: Some(relationship_type.into()),
            ..Edge::default()
        };
        edge.set_src(src.clone());
        edge.set_dest(dest.clone());
        edge
    }

    /// Creates an edge pattern without endpoints.
    pub fn pattern(relationship_type: Option<String>) -> Self {
        Edge {
            relationship_type,
            ..Edge::default()
        }
    }

    /// Builder-style property insert.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// Builder-style property map replacement.
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Attaches the source node, adopting its id when it has one.
    pub fn set_src(&mut self, node: Node) {
        if node.id.is_some() {
            self.src_id = node.id;
        }
        self.src = Some(Box::new(node));
    }

    /// Attaches the destination node, adopting its id when it has one.
    pub fn set_dest(&mut self, node: Node) {
        if node.id.is_some() {
            self.dest_id = node.id;
        }
        self.dest = Some(Box::new(node));
    }

    /// Source id, from the materialized node or the raw id.
    pub fn src_id(&self) -> Option<NodeId> {
        self.src.as_ref().and_then(|n| n.id).or(self.src_id)
    }

    /// Destination id, from the materialized node or the raw id.
    pub fn dest_id(&self) -> Option<NodeId> {
        self.dest.as_ref().and_then(|n| n.id).or(self.dest_id)
    }

    /// Relationship type as a string slice.
    pub fn relationship_type(&self) -> Option<&str> {
        self.relationship_type.as_deref()
    }

    /// True once the server has assigned an id.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => {
                self.id == other.id
                    && self.relationship_type == other.relationship_type
                    && self.src_id() == other.src_id()
                    && self.dest_id() == other.dest_id()
                    && self.properties == other.properties
            }
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.src_id() {
            Some(id) => write!(f, "(#{id})")?,
            None => f.write_str("()")?,
        }
        f.write_str("-[")?;
        if let Some(id) = self.id {
            write!(f, "#{id}")?;
        }
        if let Some(ty) = &self.relationship_type {
            write!(f, ":{ty}")?;
        }
        write_properties(f, &self.properties)?;
        f.write_str("]->")?;
        match self.dest_id() {
            Some(id) => write!(f, "(#{id})"),
            None => f.write_str("()"),
        }
    }
}
