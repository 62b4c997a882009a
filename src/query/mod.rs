#![forbid(unsafe_code)]

//! Cypher text assembly for the graph operations.
//!
//! Literals are rendered inline because `GRAPH.QUERY` takes a single query
//! string. Aliases are fixed per operation (`node`, `src`, `edge`, `dest`) so the
//! reply columns can be read back by name.

/// Filter builders for node and edge listings.
///
/// Provides a fluent API over label, type, property, ordering, and paging options.
pub mod builder;

pub use builder::{EdgeQuery, NodeQuery};

use crate::model::{Edge, Node, Properties, Value};
use crate::types::{GraphError, Result};

/// Renders a value as a Cypher literal.
///
/// Null renders as `''`: the server does not keep null properties, and an empty
/// string round-trips.
pub fn escape_value(value: &Value) -> Result<String> {
    Ok(match value {
        Value::Null => "''".to_owned(),
        Value::Int(v) => v.to_string(),
        Value::Bool(v) => v.to_string(),
        Value::Double(v) if v.is_finite() => format!("{v:?}"),
        Value::Double(_) => return Err(GraphError::Invalid("double literal must be finite")),
        Value::String(s) => quote_string(s),
        Value::Array(items) => {
            let parts = items.iter().map(escape_value).collect::<Result<Vec<_>>>()?;
            format!("[{}]", parts.join(", "))
        }
        Value::Node(_) | Value::Edge(_) | Value::Unsupported(_) => {
            return Err(GraphError::Invalid("value has no literal form"))
        }
    })
}

fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Quotes a label or relationship type with backticks.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn property_key(key: &str) -> String {
    let simple = key
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        key.to_owned()
    } else {
        quote_identifier(key)
    }
}

/// Renders a property map as `{k:v, k2:v2}`; empty maps render as `None`.
pub fn properties_to_string(props: &Properties) -> Result<Option<String>> {
    if props.is_empty() {
        return Ok(None);
    }
    let parts = props
        .iter()
        .map(|(k, v)| -> Result<String> {
            Ok(format!("{}:{}", property_key(k), escape_value(v)?))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(format!("{{{}}}", parts.join(", "))))
}

/// Renders `SET alias.k = v, ...` assignments; `None` when there is nothing to set.
pub fn set_clause(alias: &str, props: &Properties) -> Result<Option<String>> {
    if props.is_empty() {
        return Ok(None);
    }
    let parts = props
        .iter()
        .map(|(k, v)| -> Result<String> {
            Ok(format!("{alias}.{} = {}", property_key(k), escape_value(v)?))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(format!("SET {}", parts.join(", "))))
}

/// Renders `(alias:`label` {props})`.
pub fn node_pattern(alias: &str, node: &Node) -> Result<String> {
    let mut out = format!("({alias}");
    for label in &node.labels {
        out.push(':');
        out.push_str(&quote_identifier(label));
    }
    push_properties(&mut out, &node.properties)?;
    out.push(')');
    Ok(out)
}

/// Renders `(src)-[edge:`TYPE` {props}]->(dest)`.
pub fn edge_pattern(edge: &Edge) -> Result<String> {
    let mut out = String::from("(src)-[edge");
    if let Some(ty) = &edge.relationship_type {
        out.push(':');
        out.push_str(&quote_identifier(ty));
    }
    push_properties(&mut out, &edge.properties)?;
    out.push_str("]->(dest)");
    Ok(out)
}

fn push_properties(out: &mut String, props: &Properties) -> Result<()> {
    if let Some(rendered) = properties_to_string(props)? {
        out.push(' ');
        out.push_str(&rendered);
    }
    Ok(())
}
