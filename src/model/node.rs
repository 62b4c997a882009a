use std::fmt;

use serde::Serialize;

use crate::model::{Properties, Value};
use crate::types::{GraphError, NodeId, Result};

/// A graph node, either built locally or reified from a reply.
///
/// The first label is the primary one returned by [`Node::label`].
#[derive(Clone, Debug, Default, Serialize)]
pub struct Node {
    /// Server id, set once the node is persisted.
    pub id: Option<NodeId>,
    /// Labels in server order, without duplicates.
    pub labels: Vec<String>,
    /// Property map.
    pub properties: Properties,
}

impl Node {
    /// Creates an unpersisted node with a single label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: None,
            labels: vec![label.into()],
            properties: Properties::new(),
        }
    }

    /// Creates an unpersisted node without labels, used as an open match pattern.
    pub fn unlabeled() -> Self {
        Self::default()
    }

    /// Starts a builder that validates label arguments.
    pub fn builder() -> NodeBuilder {
        NodeBuilder::default()
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

    /// Primary label.
    pub fn label(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    /// All labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// True once the server has assigned an id.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Appends a label unless already present.
    pub fn add_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        if !self.labels.contains(&label) {
            self.labels.push(label);
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => {
                self.id == other.id
                    && self.labels == other.labels
                    && self.properties == other.properties
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        if let Some(id) = self.id {
            write!(f, "#{id}")?;
        }
        for label in &self.labels {
            write!(f, ":{label}")?;
        }
        write_properties(f, &self.properties)?;
        f.write_str(")")
    }
}

pub(crate) fn write_properties(f: &mut fmt::Formatter<'_>, props: &Properties) -> fmt::Result {
    if props.is_empty() {
        return Ok(());
    }
    f.write_str(" {")?;
    for (i, (key, value)) in props.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{key}: {value}")?;
    }
    f.write_str("}")
}

/// Builder for [`Node`] that rejects a label and a label list given together.
#[derive(Default)]
pub struct NodeBuilder {
    id: Option<NodeId>,
    label: Option<String>,
    labels: Option<Vec<String>>,
    properties: Properties,
}

impl NodeBuilder {
    /// Sets the server id.
    pub fn id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the single label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the label list.
    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Adds one property.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// Replaces the property map.
    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Validates and builds the node.
    pub fn build(self) -> Result<Node> {
        let labels = match (self.label, self.labels) {
            (Some(_), Some(_)) => return Err(GraphError::ConflictingLabels),
            (Some(label), None) => vec![label],
            (None, Some(labels)) => labels,
            (None, None) => Vec::new(),
        };
        let mut node = Node {
            id: self.id,
            labels: Vec::with_capacity(labels.len()),
            properties: self.properties,
        };
        for label in labels {
            node.add_label(label);
        }
        Ok(node)
    }
}
