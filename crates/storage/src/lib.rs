//! Storage layer: the document index store.
//!
//! Holds the record model, the store/transaction traits the indexer writes
//! through, a Tantivy-backed persistent store and an in-memory store.

use std::path::PathBuf;
use thiserror::Error;

pub mod memory;
pub mod models;
pub mod tantivy_store;

pub use memory::MemoryStore;
pub use models::{IndexRecord, SearchField, SearchHit, StoredRecord};
pub use tantivy_store::TantivyStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("index not found at {0}")]
    NotFound(PathBuf),
    #[error("{0} field missing in index schema")]
    MissingField(&'static str),
    #[error("invalid query field: {0}")]
    InvalidQueryField(String),
    #[error("query parse error: {0}")]
    QueryParse(#[from] tantivy::query::QueryParserError),
    #[error("tantivy error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A persistent collection of [`IndexRecord`]s keyed by path.
pub trait IndexStore {
    /// Whether an index has been created at this location.
    fn exists(&self) -> bool;

    /// Drops any existing index and creates an empty one with the record schema.
    fn create(&self) -> Result<(), StoreError>;

    /// Enumerates every stored record, sorted by path.
    fn records(&self) -> Result<Vec<StoredRecord>, StoreError>;

    /// Opens the write transaction for a run. Nothing is visible to readers
    /// until [`WriteTransaction::commit`].
    fn begin(&self) -> Result<Box<dyn WriteTransaction + '_>, StoreError>;

    /// Runs `query` against a single field.
    fn search(
        &self,
        field: SearchField,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>, StoreError>;
}

/// Buffered adds and deletes, applied in submission order on commit.
///
/// A delete submitted before an add for the same path removes only the older
/// record. Dropping a transaction without committing discards it.
pub trait WriteTransaction {
    fn add_document(&mut self, record: IndexRecord) -> Result<(), StoreError>;
    fn delete_by_key(&mut self, path: &str) -> Result<(), StoreError>;
    fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
