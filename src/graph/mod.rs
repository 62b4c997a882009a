#![forbid(unsafe_code)]

//! Handle on one named graph.
//!
//! [`Graph`] owns the transport and the per-connection [`SchemaCache`]. Every
//! query goes out as `GRAPH.QUERY <name> <cypher> --compact` and comes back as a
//! [`QueryResponse`] borrowing the handle's cache for id resolution. Node and
//! edge helpers live in `node_ops.rs` and `edge_ops.rs`.

mod edge_ops;
mod node_ops;

use redis::Value as Frame;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::decode::Decoder;
use crate::model::Value;
use crate::protocol;
use crate::response::QueryResponse;
use crate::schema::{SchemaCache, SchemaKind, SchemaSource};
use crate::transport::{RedisTransport, Transport};
use crate::types::{GraphError, Result};

/// Module name reported by `MODULE LIST` for the graph module.
pub const MODULE_NAME: &str = "graph";

/// A named graph on one server connection.
pub struct Graph {
    name: String,
    transport: Box<dyn Transport>,
    schema: SchemaCache,
    module_version: i64,
}

impl Graph {
    /// Connects using `config` and verifies the graph module is loaded.
    pub fn open(name: impl Into<String>, config: &ClientConfig) -> Result<Self> {
        let transport = RedisTransport::connect(config)?;
        Self::with_transport(name, transport)
    }

    /// Wraps an existing transport and verifies the graph module is loaded.
    pub fn with_transport(
        name: impl Into<String>,
        transport: impl Transport + 'static,
    ) -> Result<Self> {
        let name = name.into();
        let modules = transport.execute("MODULE", &["LIST"])?;
        let module_version =
            graph_module_version(&modules)?.ok_or(GraphError::ModuleMissing)?;
        info!(graph = %name, module_version, "graph.open");
        Ok(Self {
            name,
            transport: Box::new(transport),
            schema: SchemaCache::new(),
            module_version,
        })
    }

    /// Graph key name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version of the graph module reported at connect time.
    pub fn module_version(&self) -> i64 {
        self.module_version
    }

    /// The connection's schema cache.
    pub fn schema(&self) -> &SchemaCache {
        &self.schema
    }

    /// Deletes the graph and drops every cached schema list.
    pub fn delete(&self) -> Result<()> {
        self.transport.execute("GRAPH.DELETE", &[&self.name])?;
        self.schema.invalidate_all();
        info!(graph = %self.name, "graph.delete");
        Ok(())
    }

    /// Names of every graph stored on the server.
    pub fn list(&self) -> Result<Vec<String>> {
        let reply = self.transport.execute("GRAPH.LIST", &[])?;
        protocol::array(&reply, "graph list")?
            .iter()
            .map(|name| protocol::string(name, "graph name"))
            .collect()
    }

    /// Refetches and returns the label list.
    pub fn labels(&self) -> Result<Vec<String>> {
        self.schema.refresh(self, SchemaKind::Label)
    }

    /// Refetches and returns the property key list.
    pub fn properties(&self) -> Result<Vec<String>> {
        self.schema.refresh(self, SchemaKind::Property)
    }

    /// Refetches and returns the relationship type list.
    pub fn relationship_types(&self) -> Result<Vec<String>> {
        self.schema.refresh(self, SchemaKind::RelationshipType)
    }

    /// Runs `cypher` and returns the reply envelope.
    ///
    /// Server-side query errors surface as [`GraphError::Redis`].
    pub fn execute(&self, cypher: &str) -> Result<QueryResponse<'_>> {
        debug!(graph = %self.name, cypher, "graph.query");
        let reply = self.raw_query(cypher)?;
        QueryResponse::new(reply, self.decoder())
    }

    /// Runs `cypher` and returns its positional rows.
    pub fn query(&self, cypher: &str) -> Result<Vec<Vec<Value>>> {
        self.execute(cypher)?.into_rows()
    }

    fn raw_query(&self, cypher: &str) -> Result<Frame> {
        self.transport
            .execute("GRAPH.QUERY", &[&self.name, cypher, "--compact"])
    }

    fn decoder(&self) -> Decoder<'_> {
        Decoder::new(&self.schema, self)
    }
}

impl SchemaSource for Graph {
    fn fetch_schema(&self, kind: SchemaKind) -> Result<Vec<String>> {
        let reply = self.raw_query(kind.procedure())?;
        let parts = protocol::array(&reply, "schema reply")?;
        let [_, rows, _] = parts else {
            return Err(GraphError::MalformedReply(
                "schema reply must hold header, rows, statistics",
            ));
        };
        protocol::array(rows, "schema rows")?
            .iter()
            .map(|row| {
                let cell = protocol::array(row, "schema row")?
                    .first()
                    .ok_or(GraphError::MalformedReply("schema row is empty"))?;
                let (_, name) = protocol::cell(cell)?;
                protocol::string(name, "schema name")
            })
            .collect()
    }
}

/// Reads the graph module's version out of a `MODULE LIST` reply.
fn graph_module_version(reply: &Frame) -> Result<Option<i64>> {
    for module in protocol::array(reply, "module list")? {
        let fields = protocol::array(module, "module entry")?;
        let mut name = None;
        let mut version = None;
        for pair in fields.chunks_exact(2) {
            match protocol::string(&pair[0], "module field")?.as_str() {
                "name" => name = Some(protocol::string(&pair[1], "module name")?),
                "ver" => version = Some(protocol::int(&pair[1], "module version")?),
                _ => {}
            }
        }
        if name.as_deref() == Some(MODULE_NAME) {
            return Ok(version.or(Some(0)));
        }
    }
    Ok(None)
}

/// First cell of the first row, if any.
fn first_cell(rows: Vec<Vec<Value>>) -> Option<Value> {
    rows.into_iter().next()?.into_iter().next()
}
