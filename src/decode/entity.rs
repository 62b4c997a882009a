use redis::Value as Frame;
use tracing::warn;

use crate::decode::Decoder;
use crate::model::{Edge, Node, Properties};
use crate::protocol;
use crate::schema::SchemaKind;
use crate::types::{EdgeId, GraphError, LabelId, NodeId, PropId, Result, TypeId};

impl Decoder<'_> {
    /// Builds a [`Node`] from a `[id, [label ids], [properties]]` payload.
    ///
    /// Every label id is resolved and kept in server order. Ids that stay unknown
    /// after the cache refetch are dropped.
    pub fn reify_node(&self, raw: &Frame) -> Result<Node> {
        let [id, labels, props] = protocol::array(raw, "node payload")? else {
            return Err(GraphError::MalformedReply(
                "node payload must be [id, labels, properties]",
            ));
        };
        let mut node = Node {
            id: Some(NodeId(protocol::id(id, "node id")?)),
            ..Node::default()
        };
        for label in protocol::array(labels, "node label list")? {
            let label_id = LabelId(protocol::schema_id(label, "label id")?);
            match self.schema.label(self.source, label_id)? {
                Some(name) => node.add_label(name),
                None => warn!(kind = %SchemaKind::Label, id = label_id.0, "decode.unresolved"),
            }
        }
        node.properties = self.decode_properties(props)?;
        Ok(node)
    }

    /// Builds an [`Edge`] from a `[id, type id, src id, dest id, [properties]]` payload.
    ///
    /// Endpoints are kept as raw ids; callers attach nodes when the query projected them.
    pub fn reify_edge(&self, raw: &Frame) -> Result<Edge> {
        let [id, type_id, src, dest, props] = protocol::array(raw, "edge payload")? else {
            return Err(GraphError::MalformedReply(
                "edge payload must be [id, type, src, dest, properties]",
            ));
        };
        let type_id = TypeId(protocol::schema_id(type_id, "relationship type id")?);
        let relationship_type = self.schema.relationship_type(self.source, type_id)?;
        if relationship_type.is_none() {
            warn!(kind = %SchemaKind::RelationshipType, id = type_id.0, "decode.unresolved");
        }
        Ok(Edge {
            id: Some(EdgeId(protocol::id(id, "edge id")?)),
            relationship_type,
            src_id: Some(NodeId(protocol::id(src, "edge source id")?)),
            dest_id: Some(NodeId(protocol::id(dest, "edge destination id")?)),
            properties: self.decode_properties(props)?,
            ..Edge::default()
        })
    }

    /// Decodes a `[[prop id, tag, value], ...]` list into a property map.
    ///
    /// Null values stay [`crate::model::Value::Null`].
    pub fn decode_properties(&self, raw: &Frame) -> Result<Properties> {
        let mut properties = Properties::new();
        for entry in protocol::array(raw, "property list")? {
            let [prop_id, tag, value] = protocol::array(entry, "property entry")? else {
                return Err(GraphError::MalformedReply(
                    "property entry must be [id, type, value]",
                ));
            };
            let prop_id = PropId(protocol::schema_id(prop_id, "property id")?);
            let tag = protocol::int(tag, "property type tag")?;
            let value = self.decode(tag, value)?;
            match self.schema.property(self.source, prop_id)? {
                Some(name) => {
                    properties.insert(name, value);
                }
                None => warn!(kind = %SchemaKind::Property, id = prop_id.0, "decode.unresolved"),
            }
        }
        Ok(properties)
    }
}
