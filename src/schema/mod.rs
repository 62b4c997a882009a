#![forbid(unsafe_code)]

//! Per-connection id→name caches for labels, property keys, and relationship types.
//!
//! The compact protocol sends schema elements as positions into server-side
//! lists. Each list is fetched lazily on first use and refetched at most once per
//! missed lookup, which tolerates schema growth from other writers without
//! looping when an id is genuinely unknown.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::types::{GraphError, LabelId, PropId, Result, TypeId};

/// The three independent schema lists.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    /// Node labels.
    Label,
    /// Property keys, shared by nodes and edges.
    Property,
    /// Relationship types.
    RelationshipType,
}

impl SchemaKind {
    /// All kinds, in a stable order.
    pub const ALL: [SchemaKind; 3] = [
        SchemaKind::Label,
        SchemaKind::Property,
        SchemaKind::RelationshipType,
    ];

    /// Procedure that lists this kind on the server.
    pub fn procedure(self) -> &'static str {
        match self {
            SchemaKind::Label => "CALL db.labels()",
            SchemaKind::Property => "CALL db.propertyKeys()",
            SchemaKind::RelationshipType => "CALL db.relationshipTypes()",
        }
    }

    fn slot(self) -> usize {
        match self {
            SchemaKind::Label => 0,
            SchemaKind::Property => 1,
            SchemaKind::RelationshipType => 2,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SchemaKind::Label => "label",
            SchemaKind::Property => "property key",
            SchemaKind::RelationshipType => "relationship type",
        })
    }
}

/// Supplies full schema lists, ordered so that position equals id.
pub trait SchemaSource {
    /// Fetches the complete current list for `kind`.
    fn fetch_schema(&self, kind: SchemaKind) -> Result<Vec<String>>;
}

#[derive(Default)]
struct SchemaMetrics {
    resolve_calls: AtomicU64,
    resolve_hits: AtomicU64,
    resolve_misses: AtomicU64,
    fetches: AtomicU64,
    unresolved: AtomicU64,
}

/// Point-in-time view of cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SchemaMetricsSnapshot {
    /// Lookups requested.
    pub resolve_calls: u64,
    /// Lookups answered from the cached list on the first attempt.
    pub resolve_hits: u64,
    /// Lookups whose first attempt missed.
    pub resolve_misses: u64,
    /// Lists fetched from the server, initial loads included.
    pub fetches: u64,
    /// Lookups that stayed unresolved after the refetch.
    pub unresolved: u64,
}

impl SchemaMetrics {
    fn snapshot(&self) -> SchemaMetricsSnapshot {
        SchemaMetricsSnapshot {
            resolve_calls: self.resolve_calls.load(Ordering::Relaxed),
            resolve_hits: self.resolve_hits.load(Ordering::Relaxed),
            resolve_misses: self.resolve_misses.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            unresolved: self.unresolved.load(Ordering::Relaxed),
        }
    }

    fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Lazily populated schema lists for one graph connection.
///
/// Each kind sits behind its own lock, held across the check-fetch-store
/// sequence so concurrent callers never observe a half-refreshed list.
#[derive(Default)]
pub struct SchemaCache {
    lists: [Mutex<Option<Vec<String>>>; 3],
    metrics: SchemaMetrics,
}

impl SchemaCache {
    /// Creates an empty cache; nothing is fetched until the first lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `id` of `kind` to its name.
    ///
    /// Returns `Ok(None)` when the id is still unknown after one refetch. Fetch
    /// failures are returned as [`GraphError::SchemaFetch`].
    pub fn resolve(
        &self,
        source: &dyn SchemaSource,
        kind: SchemaKind,
        id: u32,
    ) -> Result<Option<String>> {
        SchemaMetrics::inc(&self.metrics.resolve_calls);
        let mut guard = self.lists[kind.slot()].lock();
        let index = id as usize;

        if guard.is_none() {
            *guard = Some(self.fetch(source, kind)?);
        }
        if let Some(name) = guard.as_ref().and_then(|names| names.get(index)) {
            SchemaMetrics::inc(&self.metrics.resolve_hits);
            return Ok(Some(name.clone()));
        }

        SchemaMetrics::inc(&self.metrics.resolve_misses);
        trace!(%kind, id, "schema.resolve.miss");
        debug!(%kind, id, "schema.refetch");
        *guard = Some(self.fetch(source, kind)?);
        let name = guard.as_ref().and_then(|names| names.get(index)).cloned();
        if name.is_none() {
            SchemaMetrics::inc(&self.metrics.unresolved);
        }
        Ok(name)
    }

    /// Resolves a label id.
    pub fn label(&self, source: &dyn SchemaSource, id: LabelId) -> Result<Option<String>> {
        self.resolve(source, SchemaKind::Label, id.0)
    }

    /// Resolves a property key id.
    pub fn property(&self, source: &dyn SchemaSource, id: PropId) -> Result<Option<String>> {
        self.resolve(source, SchemaKind::Property, id.0)
    }

    /// Resolves a relationship type id.
    pub fn relationship_type(
        &self,
        source: &dyn SchemaSource,
        id: TypeId,
    ) -> Result<Option<String>> {
        self.resolve(source, SchemaKind::RelationshipType, id.0)
    }

    /// Unconditionally refetches `kind` and returns the fresh list.
    pub fn refresh(&self, source: &dyn SchemaSource, kind: SchemaKind) -> Result<Vec<String>> {
        let mut guard = self.lists[kind.slot()].lock();
        let names = self.fetch(source, kind)?;
        *guard = Some(names.clone());
        Ok(names)
    }

    /// Returns the cached list for `kind` without fetching.
    pub fn cached(&self, kind: SchemaKind) -> Option<Vec<String>> {
        self.lists[kind.slot()].lock().clone()
    }

    /// Drops every cached list; the next lookup of each kind fetches again.
    pub fn invalidate_all(&self) {
        for list in &self.lists {
            *list.lock() = None;
        }
    }

    /// Returns the current counters.
    pub fn metrics_snapshot(&self) -> SchemaMetricsSnapshot {
        self.metrics.snapshot()
    }

    fn fetch(&self, source: &dyn SchemaSource, kind: SchemaKind) -> Result<Vec<String>> {
        SchemaMetrics::inc(&self.metrics.fetches);
        let names = source
            .fetch_schema(kind)
            .map_err(|err| GraphError::SchemaFetch {
                kind,
                source: Box::new(err),
            })?;
        trace!(%kind, len = names.len(), "schema.fetch");
        Ok(names)
    }
}
