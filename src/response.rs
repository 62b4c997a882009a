#![forbid(unsafe_code)]

//! Envelope around one compact `GRAPH.QUERY` reply.
//!
//! A reply carries a header of `[column kind, name]` pairs, the body rows, and
//! trailing `"<Label>: <value>"` statistics lines. Queries without a `RETURN`
//! clause reply with the statistics only. Every derived view is computed on first
//! access and then memoized for the lifetime of the envelope.

use std::sync::OnceLock;

use redis::Value as Frame;
use serde::Serialize;
use tracing::debug;

use crate::decode::Decoder;
use crate::model::Value;
use crate::protocol;
use crate::types::{GraphError, Result};

/// Counters and timing reported after a query. Unreported fields stay `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QueryStats {
    /// `Nodes created`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_created: Option<u64>,
    /// `Nodes deleted`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_deleted: Option<u64>,
    /// `Relationships created`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships_created: Option<u64>,
    /// `Relationships deleted`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships_deleted: Option<u64>,
    /// `Properties set`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties_set: Option<u64>,
    /// `Query internal execution time`, verbatim with its unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_execution_time: Option<String>,
}

impl QueryStats {
    /// Parses statistics lines, ignoring unrecognized ones.
    pub fn parse<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stats = QueryStats::default();
        for line in lines {
            let line = line.as_ref();
            let Some((label, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            let slot = if label.starts_with("Nodes created") {
                &mut stats.nodes_created
            } else if label.starts_with("Nodes deleted") {
                &mut stats.nodes_deleted
            } else if label.starts_with("Relationships created") {
                &mut stats.relationships_created
            } else if label.starts_with("Relationships deleted") {
                &mut stats.relationships_deleted
            } else if label.starts_with("Properties set") {
                &mut stats.properties_set
            } else if label.starts_with("Query internal execution time") {
                stats.internal_execution_time = Some(value.to_owned());
                continue;
            } else {
                continue;
            };
            match value.parse() {
                Ok(count) => *slot = Some(count),
                Err(_) => debug!(line, "response.stats.unparsed"),
            }
        }
        stats
    }
}

/// One row of a result set, keyed by column name in column order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Record(Vec<(String, Value)>);

impl Record {
    /// Returns the value of the first column named `column`.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.iter().find(|(name, _)| name == column).map(|(_, v)| v)
    }

    /// Removes and returns the value of the first column named `column`.
    pub fn take(&mut self, column: &str) -> Option<Value> {
        let pos = self.0.iter().position(|(name, _)| name == column)?;
        Some(self.0.remove(pos).1)
    }

    /// Iterates `(column, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parsed view over a completed reply.
pub struct QueryResponse<'a> {
    header: Vec<Frame>,
    body: Vec<Frame>,
    stats_lines: Vec<Frame>,
    decoder: Decoder<'a>,
    columns: OnceLock<Vec<String>>,
    stats: OnceLock<QueryStats>,
    rows: OnceLock<Vec<Vec<Value>>>,
    result_set: OnceLock<Vec<Record>>,
}

impl<'a> QueryResponse<'a> {
    /// Splits a raw reply into header, body, and statistics.
    pub fn new(reply: Frame, decoder: Decoder<'a>) -> Result<Self> {
        let Frame::Bulk(parts) = reply else {
            return Err(GraphError::MalformedReply("query reply must be an array"));
        };
        let mut parts = parts.into_iter();
        let (header, body, stats) = match (parts.next(), parts.next(), parts.next(), parts.next())
        {
            (Some(stats), None, None, None) => (Frame::Nil, Frame::Nil, stats),
            (Some(header), Some(body), Some(stats), None) => (header, body, stats),
            _ => {
                return Err(GraphError::MalformedReply(
                    "query reply must hold statistics or header, rows, statistics",
                ))
            }
        };
        let header = into_items(header, "reply header")?;
        for entry in &header {
            column_name(entry)?;
        }
        Ok(Self {
            header,
            body: into_items(body, "reply rows")?,
            stats_lines: into_items(stats, "reply statistics")?,
            decoder,
            columns: OnceLock::new(),
            stats: OnceLock::new(),
            rows: OnceLock::new(),
            result_set: OnceLock::new(),
        })
    }

    /// Column names, in header order. The column kind tag is ignored.
    pub fn columns(&self) -> &[String] {
        self.columns.get_or_init(|| {
            self.header
                .iter()
                .filter_map(|entry| column_name(entry).ok())
                .collect()
        })
    }

    /// Recognized statistics.
    pub fn stats(&self) -> &QueryStats {
        self.stats.get_or_init(|| {
            QueryStats::parse(
                self.stats_lines
                    .iter()
                    .filter_map(|line| protocol::string(line, "statistics line").ok()),
            )
        })
    }

    /// Positional rows, each cell decoded independently.
    pub fn rows(&self) -> Result<&[Vec<Value>]> {
        if let Some(rows) = self.rows.get() {
            return Ok(rows);
        }
        let rows = self
            .body
            .iter()
            .map(|row| {
                protocol::array(row, "result row")?
                    .iter()
                    .map(|cell| self.decoder.decode_cell(cell))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.rows.get_or_init(|| rows))
    }

    /// Rows keyed by column name.
    pub fn result_set(&self) -> Result<&[Record]> {
        if let Some(records) = self.result_set.get() {
            return Ok(records);
        }
        let columns = self.columns();
        let records = self
            .rows()?
            .iter()
            .map(|row| {
                if row.len() != columns.len() {
                    debug!(
                        cells = row.len(),
                        columns = columns.len(),
                        "response.row.width_mismatch"
                    );
                }
                Record(columns.iter().cloned().zip(row.iter().cloned()).collect())
            })
            .collect();
        Ok(self.result_set.get_or_init(|| records))
    }

    /// Consumes the envelope, returning the decoded rows.
    pub fn into_rows(self) -> Result<Vec<Vec<Value>>> {
        self.rows()?;
        Ok(self.rows.into_inner().unwrap_or_default())
    }

    /// Consumes the envelope, returning the keyed records.
    pub fn into_result_set(self) -> Result<Vec<Record>> {
        self.result_set()?;
        Ok(self.result_set.into_inner().unwrap_or_default())
    }
}

fn column_name(entry: &Frame) -> Result<String> {
    let name = match entry {
        Frame::Bulk(pair) => match pair.as_slice() {
            [_, name] => name,
            _ => return Err(GraphError::MalformedReply("header entry must be [kind, name]")),
        },
        bare => bare,
    };
    protocol::string(name, "column name")
}

fn into_items(frame: Frame, what: &'static str) -> Result<Vec<Frame>> {
    match frame {
        Frame::Bulk(items) => Ok(items),
        Frame::Nil => Ok(Vec::new()),
        _ => Err(GraphError::MalformedReply(what)),
    }
}
