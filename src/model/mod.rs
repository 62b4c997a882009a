#![forbid(unsafe_code)]

//! Typed graph entities produced by the decoder and consumed by the query layer.

mod edge;
mod node;
mod properties;
mod value;

pub use edge::Edge;
pub use node::{Node, NodeBuilder};
pub use properties::Properties;
pub use value::Value;
