use tracing::debug;

use crate::graph::{first_cell, Graph};
use crate::model::{Node, Value};
use crate::query::{node_pattern, set_clause, NodeQuery};
use crate::types::{GraphError, NodeId, Result};

impl Graph {
    /// Creates `node` and records the id the server assigned.
    pub fn add_node(&self, node: &mut Node) -> Result<NodeId> {
        self.write_node("CREATE", node)
    }

    /// Matches or creates `node` and records its id.
    pub fn merge_node(&self, node: &mut Node) -> Result<NodeId> {
        self.write_node("MERGE", node)
    }

    fn write_node(&self, verb: &str, node: &mut Node) -> Result<NodeId> {
        let cypher = format!("{verb} {} RETURN ID(node)", node_pattern("node", node)?);
        let id = match first_cell(self.query(&cypher)?) {
            Some(Value::Int(id)) => u64::try_from(id)
                .map_err(|_| GraphError::MalformedReply("node id must be non-negative"))?,
            _ => return Err(GraphError::MalformedReply("write did not return a node id")),
        };
        let id = NodeId(id);
        node.id = Some(id);
        debug!(graph = %self.name, verb, id = id.0, "graph.node.write");
        Ok(id)
    }

    /// Fetches one node by id.
    pub fn find_node_by_id(&self, id: NodeId) -> Result<Option<Node>> {
        let cypher = format!("MATCH (node) WHERE ID(node) = {id} RETURN node");
        Ok(first_cell(self.query(&cypher)?).and_then(Value::into_node))
    }

    /// Lists nodes matching `filter`.
    pub fn nodes(&self, filter: &NodeQuery) -> Result<Vec<Node>> {
        let rows = self.query(&filter.match_cypher()?)?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_iter().next().and_then(Value::into_node))
            .collect())
    }

    /// Counts nodes matching `filter`. Paging options are ignored.
    pub fn count_nodes(&self, filter: &NodeQuery) -> Result<u64> {
        match first_cell(self.query(&filter.count_cypher()?)?) {
            None => Ok(0),
            Some(Value::Int(count)) => u64::try_from(count)
                .map_err(|_| GraphError::MalformedReply("count must be non-negative")),
            Some(_) => Err(GraphError::MalformedReply("count must be an integer")),
        }
    }

    /// Writes every property of `node` to the stored node and returns the result.
    ///
    /// Returns `None` when no node has that id any more.
    pub fn update_node(&self, node: &Node) -> Result<Option<Node>> {
        let id = persisted_id(node)?;
        let mut cypher = format!("MATCH (node) WHERE ID(node) = {id}");
        if let Some(set) = set_clause("node", &node.properties)? {
            cypher.push(' ');
            cypher.push_str(&set);
        }
        cypher.push_str(" RETURN node");
        Ok(first_cell(self.query(&cypher)?).and_then(Value::into_node))
    }

    /// Deletes the stored node. True when the server reported one deletion.
    pub fn destroy_node(&self, node: &Node) -> Result<bool> {
        let id = persisted_id(node)?;
        let response = self.execute(&format!("MATCH (node) WHERE ID(node) = {id} DELETE node"))?;
        Ok(response.stats().nodes_deleted == Some(1))
    }
}

fn persisted_id(node: &Node) -> Result<NodeId> {
    node.id.ok_or(GraphError::Invalid("node must be persisted"))
}
