#![forbid(unsafe_code)]

//! Compact reply protocol of the graph module.
//!
//! With `--compact`, `GRAPH.QUERY` answers with positionally typed frames: every
//! cell is a `[type tag, raw value]` pair and schema elements travel as integer
//! ids. This module names the tags and offers typed accessors over the raw
//! `redis::Value` frames so the decoder never matches on frame variants itself.

use std::fmt;

use redis::Value as Frame;
use serde::Serialize;

use crate::types::{GraphError, Result};

/// Wire type tag carried by every compact cell. Ordinals are part of the protocol.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum ValueType {
    /// Type the server could not classify.
    Unknown = 0,
    /// Null.
    Null = 1,
    /// UTF-8 string.
    String = 2,
    /// Signed 64-bit integer.
    Integer = 3,
    /// Boolean, sent as `"true"`/`"false"`.
    Boolean = 4,
    /// Double, sent as its decimal string.
    Double = 5,
    /// Nested array of cells.
    Array = 6,
    /// Edge payload.
    Edge = 7,
    /// Node payload.
    Node = 8,
    /// Path payload.
    Path = 9,
    /// Map payload.
    Map = 10,
    /// Geographic point.
    Point = 11,
}

impl ValueType {
    /// Returns the wire ordinal.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Maps a wire tag to its type, or `None` when the tag is outside the enumeration.
    pub fn from_tag(tag: i64) -> Option<Self> {
        Some(match tag {
            0 => ValueType::Unknown,
            1 => ValueType::Null,
            2 => ValueType::String,
            3 => ValueType::Integer,
            4 => ValueType::Boolean,
            5 => ValueType::Double,
            6 => ValueType::Array,
            7 => ValueType::Edge,
            8 => ValueType::Node,
            9 => ValueType::Path,
            10 => ValueType::Map,
            11 => ValueType::Point,
            _ => return None,
        })
    }

    /// True for tags the decoder recognizes but does not interpret.
    pub fn is_unsupported(self) -> bool {
        matches!(
            self,
            ValueType::Unknown | ValueType::Path | ValueType::Map | ValueType::Point
        )
    }
}

impl TryFrom<i64> for ValueType {
    type Error = GraphError;

    fn try_from(tag: i64) -> Result<Self> {
        ValueType::from_tag(tag).ok_or(GraphError::UnknownValueType(tag))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Unknown => "unknown",
            ValueType::Null => "null",
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Boolean => "boolean",
            ValueType::Double => "double",
            ValueType::Array => "array",
            ValueType::Edge => "edge",
            ValueType::Node => "node",
            ValueType::Path => "path",
            ValueType::Map => "map",
            ValueType::Point => "point",
        };
        f.write_str(name)
    }
}

/// Reads an integer frame. Integers occasionally arrive as bulk strings.
pub fn int(frame: &Frame, what: &'static str) -> Result<i64> {
    match frame {
        Frame::Int(value) => Ok(*value),
        Frame::Data(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .ok_or(GraphError::MalformedReply(what)),
        _ => Err(GraphError::MalformedReply(what)),
    }
}

/// Reads a non-negative integer frame as an id.
pub fn id(frame: &Frame, what: &'static str) -> Result<u64> {
    let raw = int(frame, what)?;
    u64::try_from(raw).map_err(|_| GraphError::MalformedReply(what))
}

/// Reads a schema id, which must fit in 32 bits.
pub fn schema_id(frame: &Frame, what: &'static str) -> Result<u32> {
    let raw = int(frame, what)?;
    u32::try_from(raw).map_err(|_| GraphError::MalformedReply(what))
}

/// Reads a string frame.
pub fn string(frame: &Frame, what: &'static str) -> Result<String> {
    match frame {
        Frame::Data(bytes) => {
            String::from_utf8(bytes.clone()).map_err(|_| GraphError::MalformedReply(what))
        }
        Frame::Status(s) => Ok(s.clone()),
        Frame::Okay => Ok("OK".to_owned()),
        _ => Err(GraphError::MalformedReply(what)),
    }
}

/// Reads an array frame. A nil frame reads as an empty array.
pub fn array<'a>(frame: &'a Frame, what: &'static str) -> Result<&'a [Frame]> {
    match frame {
        Frame::Bulk(items) => Ok(items.as_slice()),
        Frame::Nil => Ok(&[]),
        _ => Err(GraphError::MalformedReply(what)),
    }
}

/// Splits a compact `[tag, value]` cell.
pub fn cell(frame: &Frame) -> Result<(i64, &Frame)> {
    match array(frame, "cell must be a [type, value] pair")? {
        [tag, value] => Ok((int(tag, "cell type tag must be an integer")?, value)),
        _ => Err(GraphError::MalformedReply("cell must be a [type, value] pair")),
    }
}
