//! Fluent filters for node and edge listings.

use crate::model::{Edge, Node, Properties, Value};
use crate::query::{edge_pattern, node_pattern};
use crate::types::{GraphError, NodeId, Result};

/// Ordering and paging shared by both listings.
#[derive(Clone, Debug, Default)]
struct Paging {
    order: Option<String>,
    skip: Option<u64>,
    limit: Option<u64>,
}

impl Paging {
    fn render(&self, alias: &'static str) -> Result<String> {
        let mut out = String::new();
        if let Some(order) = &self.order {
            if !order.contains(&format!("{alias}.")) {
                return Err(GraphError::MissingAliasPrefix {
                    alias,
                    order: order.clone(),
                });
            }
            out.push_str(" ORDER BY ");
            out.push_str(order);
        }
        if let Some(skip) = self.skip {
            out.push_str(&format!(" SKIP {skip}"));
        }
        if let Some(limit) = self.limit {
            out.push_str(&format!(" LIMIT {limit}"));
        }
        Ok(out)
    }
}

/// Filter for [`crate::Graph::nodes`] and [`crate::Graph::count_nodes`].
///
/// Order clauses reference the `node` alias, e.g. `node.name DESC`.
#[derive(Clone, Debug, Default)]
pub struct NodeQuery {
    label: Option<String>,
    properties: Properties,
    paging: Paging,
}

impl NodeQuery {
    /// Matches every node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to nodes carrying `label`.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Requires `key` to equal `value`.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// Requires every entry of `properties` to match.
    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Sets the `ORDER BY` expression.
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.paging.order = Some(order.into());
        self
    }

    /// Skips the first `skip` matches.
    pub fn skip(mut self, skip: u64) -> Self {
        self.paging.skip = Some(skip);
        self
    }

    /// Returns at most `limit` matches.
    pub fn limit(mut self, limit: u64) -> Self {
        self.paging.limit = Some(limit);
        self
    }

    fn pattern(&self) -> Result<String> {
        let node = Node {
            labels: self.label.iter().cloned().collect(),
            properties: self.properties.clone(),
            ..Node::default()
        };
        node_pattern("node", &node)
    }

    pub(crate) fn match_cypher(&self) -> Result<String> {
        Ok(format!(
            "MATCH {} RETURN node{}",
            self.pattern()?,
            self.paging.render("node")?
        ))
    }

    pub(crate) fn count_cypher(&self) -> Result<String> {
        Ok(format!("MATCH {} RETURN COUNT(node)", self.pattern()?))
    }
}

/// Filter for [`crate::Graph::edges`] and [`crate::Graph::count_edges`].
///
/// Order clauses reference the `edge` alias, e.g. `edge.since ASC`.
#[derive(Clone, Debug, Default)]
pub struct EdgeQuery {
    relationship_type: Option<String>,
    src: Option<NodeId>,
    dest: Option<NodeId>,
    properties: Properties,
    paging: Paging,
    rejected: Option<&'static str>,
}

impl EdgeQuery {
    /// Matches every edge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one relationship type.
    pub fn relationship_type(mut self, ty: impl Into<String>) -> Self {
        self.relationship_type = Some(ty.into());
        self
    }

    /// Restricts to edges leaving `node`, which must be persisted.
    pub fn src(mut self, node: &Node) -> Self {
        match node.id {
            Some(id) => self.src = Some(id),
            None => self.rejected = Some("source node must be persisted"),
        }
        self
    }

    /// Restricts to edges entering `node`, which must be persisted.
    pub fn dest(mut self, node: &Node) -> Self {
        match node.id {
            Some(id) => self.dest = Some(id),
            None => self.rejected = Some("destination node must be persisted"),
        }
        self
    }

    /// Requires `key` to equal `value`.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// Requires every entry of `properties` to match.
    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Sets the `ORDER BY` expression.
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.paging.order = Some(order.into());
        self
    }

    /// Skips the first `skip` matches.
    pub fn skip(mut self, skip: u64) -> Self {
        self.paging.skip = Some(skip);
        self
    }

    /// Returns at most `limit` matches.
    pub fn limit(mut self, limit: u64) -> Self {
        self.paging.limit = Some(limit);
        self
    }

    fn pattern(&self) -> Result<String> {
        if let Some(reason) = self.rejected {
            return Err(GraphError::Invalid(reason));
        }
        let edge = Edge::pattern(self.relationship_type.clone())
            .with_properties(self.properties.clone());
        edge_pattern(&edge)
    }

    fn where_clause(&self) -> String {
        let clauses: Vec<String> = [
            self.src.map(|id| format!("ID(src) = {id}")),
            self.dest.map(|id| format!("ID(dest) = {id}")),
        ]
        .into_iter()
        .flatten()
        .collect();
        if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        }
    }

    pub(crate) fn match_cypher(&self) -> Result<String> {
        Ok(format!(
            "MATCH {}{} RETURN src, edge, dest{}",
            self.pattern()?,
            self.where_clause(),
            self.paging.render("edge")?
        ))
    }

    pub(crate) fn count_cypher(&self) -> Result<String> {
        Ok(format!(
            "MATCH {}{} RETURN COUNT(edge)",
            self.pattern()?,
            self.where_clause()
        ))
    }
}
