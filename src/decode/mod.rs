#![forbid(unsafe_code)]

//! Turns compact reply cells into typed values.
//!
//! [`Decoder`] bundles the schema cache with the source it refreshes from, so
//! node and edge payloads can resolve their integer schema ids. The value
//! decoder lives in `value.rs`, node/edge reification in `entity.rs`.

mod entity;
mod value;

use crate::schema::{SchemaCache, SchemaSource};

/// Decoding context for one connection.
#[derive(Clone, Copy)]
pub struct Decoder<'a> {
    schema: &'a SchemaCache,
    source: &'a dyn SchemaSource,
}

impl<'a> Decoder<'a> {
    /// Binds a cache to the source it should refetch from on a miss.
    pub fn new(schema: &'a SchemaCache, source: &'a dyn SchemaSource) -> Self {
        Self { schema, source }
    }
}
