use tracing::debug;

use crate::graph::{first_cell, Graph};
use crate::model::{Edge, Value};
use crate::query::{edge_pattern, EdgeQuery};
use crate::types::{EdgeId, GraphError, NodeId, Result};

impl Graph {
    /// Creates `edge` between its persisted endpoints.
    ///
    /// Returns `None` unless exactly one relationship was created.
    pub fn add_edge(&self, edge: &mut Edge) -> Result<Option<EdgeId>> {
        self.write_edge("CREATE", edge)
    }

    /// Matches or creates `edge` between its persisted endpoints.
    pub fn merge_edge(&self, edge: &mut Edge) -> Result<Option<EdgeId>> {
        self.write_edge("MERGE", edge)
    }

    fn write_edge(&self, verb: &str, edge: &mut Edge) -> Result<Option<EdgeId>> {
        let (src, dest) = endpoints(edge)?;
        let cypher = format!(
            "MATCH (src), (dest) WHERE ID(src) = {src} AND ID(dest) = {dest} {verb} {} RETURN ID(edge)",
            edge_pattern(edge)?
        );
        let response = self.execute(&cypher)?;
        if response.stats().relationships_created != Some(1) {
            debug!(graph = %self.name, verb, "graph.edge.not_created");
            return Ok(None);
        }
        let id = match first_cell(response.into_rows()?) {
            Some(Value::Int(id)) => u64::try_from(id)
                .map_err(|_| GraphError::MalformedReply("edge id must be non-negative"))?,
            _ => return Err(GraphError::MalformedReply("write did not return an edge id")),
        };
        let id = EdgeId(id);
        edge.id = Some(id);
        debug!(graph = %self.name, verb, id = id.0, "graph.edge.write");
        Ok(Some(id))
    }

    /// Lists edges matching `filter`, with both endpoints attached.
    pub fn edges(&self, filter: &EdgeQuery) -> Result<Vec<Edge>> {
        let records = self.execute(&filter.match_cypher()?)?.into_result_set()?;
        let mut edges = Vec::with_capacity(records.len());
        for mut record in records {
            let Some(Value::Edge(mut edge)) = record.take("edge") else {
                return Err(GraphError::MalformedReply("edge listing row has no edge column"));
            };
            if let Some(src) = record.take("src").and_then(Value::into_node) {
                edge.set_src(src);
            }
            if let Some(dest) = record.take("dest").and_then(Value::into_node) {
                edge.set_dest(dest);
            }
            edges.push(edge);
        }
        Ok(edges)
    }

    /// Counts edges matching `filter`. Paging options are ignored.
    pub fn count_edges(&self, filter: &EdgeQuery) -> Result<u64> {
        match first_cell(self.query(&filter.count_cypher()?)?) {
            None => Ok(0),
            Some(Value::Int(count)) => u64::try_from(count)
                .map_err(|_| GraphError::MalformedReply("count must be non-negative")),
            Some(_) => Err(GraphError::MalformedReply("count must be an integer")),
        }
    }
}

fn endpoints(edge: &Edge) -> Result<(NodeId, NodeId)> {
    let src = edge
        .src_id()
        .ok_or(GraphError::Invalid("edge source must be persisted"))?;
    let dest = edge
        .dest_id()
        .ok_or(GraphError::Invalid("edge destination must be persisted"))?;
    Ok((src, dest))
}
