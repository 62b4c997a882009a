use redis::Value as Frame;
use tracing::trace;

use crate::decode::Decoder;
use crate::model::Value;
use crate::protocol::{self, ValueType};
use crate::types::{GraphError, Result};

impl Decoder<'_> {
    /// Decodes a `[tag, value]` cell.
    pub fn decode_cell(&self, frame: &Frame) -> Result<Value> {
        let (tag, raw) = protocol::cell(frame)?;
        self.decode(tag, raw)
    }

    /// Decodes `raw` according to its wire tag.
    ///
    /// Node and edge payloads are handed to the entity reifier. Path, map, point,
    /// and unknown tags yield [`Value::Unsupported`]; tags outside the protocol
    /// enumeration are an error.
    pub fn decode(&self, tag: i64, raw: &Frame) -> Result<Value> {
        let ty = ValueType::try_from(tag)?;
        let value = match ty {
            ValueType::Null => Value::Null,
            ValueType::String => Value::String(protocol::string(raw, "string value")?),
            ValueType::Integer => Value::Int(protocol::int(raw, "integer value")?),
            ValueType::Boolean => Value::Bool(decode_bool(raw)?),
            ValueType::Double => Value::Double(decode_double(raw)?),
            ValueType::Array => {
                let items = protocol::array(raw, "array value")?;
                Value::Array(
                    items
                        .iter()
                        .map(|item| self.decode_cell(item))
                        .collect::<Result<Vec<_>>>()?,
                )
            }
            ValueType::Node => Value::Node(self.reify_node(raw)?),
            ValueType::Edge => Value::Edge(self.reify_edge(raw)?),
            ValueType::Unknown | ValueType::Path | ValueType::Map | ValueType::Point => {
                trace!(%ty, "decode.unsupported");
                Value::Unsupported(ty)
            }
        };
        Ok(value)
    }
}

fn decode_bool(raw: &Frame) -> Result<bool> {
    match raw {
        Frame::Int(v) => Ok(*v != 0),
        _ => match protocol::string(raw, "boolean value")?.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(GraphError::MalformedReply("boolean value")),
        },
    }
}

fn decode_double(raw: &Frame) -> Result<f64> {
    match raw {
        Frame::Int(v) => Ok(*v as f64),
        _ => protocol::string(raw, "double value")?
            .trim()
            .parse()
            .map_err(|_| GraphError::MalformedReply("double value")),
    }
}
