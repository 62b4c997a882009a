//! Identifier newtypes and the crate-wide error type.
#![forbid(unsafe_code)]

use std::fmt;

use thiserror::Error;

use crate::schema::SchemaKind;

/// Server-assigned identifier of a persisted node.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, serde::Serialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);
/// Server-assigned identifier of a persisted edge.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, serde::Serialize)]
#[serde(transparent)]
pub struct EdgeId(pub u64);
/// Position of a label in the server's label list.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct LabelId(pub u32);
/// Position of a property key in the server's property key list.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct PropId(pub u32);
/// Position of a relationship type in the server's relationship type list.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct TypeId(pub u32);

/// Errors surfaced by the client.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Connection or command failure reported by the redis client.
    #[error("transport error: {0}")]
    Redis(#[from] redis::RedisError),
    /// Fetching a schema list failed; decoding cannot continue without it.
    #[error("failed to fetch {kind} list: {source}")]
    SchemaFetch {
        /// Which schema list was being fetched.
        kind: SchemaKind,
        /// Underlying failure.
        source: Box<GraphError>,
    },
    /// The server does not have the graph module loaded.
    #[error("graph module not loaded on server")]
    ModuleMissing,
    /// A reply frame did not have the shape the compact protocol promises.
    #[error("malformed reply: {0}")]
    MalformedReply(&'static str),
    /// A value tag outside the defined enumeration.
    #[error("unknown value type tag {0}")]
    UnknownValueType(i64),
    /// A node was given both a single label and a label list.
    #[error("node cannot take both a label and a label list")]
    ConflictingLabels,
    /// An order clause does not reference the expected alias.
    #[error("order clause '{order}' must reference the '{alias}.' alias")]
    MissingAliasPrefix {
        /// Alias the clause must use.
        alias: &'static str,
        /// Offending clause.
        order: String,
    },
    /// Invalid argument supplied by the caller.
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GraphError>;

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        NodeId(value)
    }
}

impl From<u64> for EdgeId {
    fn from(value: u64) -> Self {
        EdgeId(value)
    }
}

impl From<u32> for LabelId {
    fn from(value: u32) -> Self {
        LabelId(value)
    }
}

impl From<u32> for PropId {
    fn from(value: u32) -> Self {
        PropId(value)
    }
}

impl From<u32> for TypeId {
    fn from(value: u32) -> Self {
        TypeId(value)
    }
}
