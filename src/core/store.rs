//! Record store trait
//!
//! The store owns the JSON document: a map from collection name to an ordered
//! array of records. Readers take a [`snapshot`](RecordStore::snapshot), a
//! point-in-time copy, and never hold a handle into the live document.
//! Mutations locate records with a predicate and apply under a single lock
//! acquisition. A durable store commits a mutation to disk before returning
//! it; a failed write leaves the document unchanged.

use crate::core::error::StoreError;
use crate::core::record::Record;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Predicate used to locate records
pub type Predicate<'a> = &'a (dyn Fn(&Record) -> bool + Send + Sync);

/// Storage trait for collection-oriented JSON documents
///
/// Implementations must keep record order stable: inserts append, removals
/// close the gap, updates stay in place.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Whole document as a JSON object
    async fn document(&self) -> Result<Value, StoreError>;

    /// Copy of a collection, `None` if the document has no such array
    async fn snapshot(&self, collection: &str) -> Result<Option<Vec<Record>>, StoreError>;

    /// Index of the first record matching `predicate`
    async fn find_index(
        &self,
        collection: &str,
        predicate: Predicate<'_>,
    ) -> Result<Option<usize>, StoreError>;

    /// Append a record, creating the collection if needed
    ///
    /// An object without an `id` receives one: the next integer when every
    /// existing id is numeric, a UUID v4 string otherwise.
    async fn insert(&self, collection: &str, record: Record) -> Result<Record, StoreError>;

    /// Shallow-merge `patch` into the first record matching `predicate`
    ///
    /// Returns the updated record, or `None` when nothing matched.
    async fn update(
        &self,
        collection: &str,
        predicate: Predicate<'_>,
        patch: Map<String, Value>,
    ) -> Result<Option<Record>, StoreError>;

    /// Like [`update`](RecordStore::update), returning the whole collection as
    /// it stood right after the change
    async fn update_and_list(
        &self,
        collection: &str,
        predicate: Predicate<'_>,
        patch: Map<String, Value>,
    ) -> Result<Option<Vec<Record>>, StoreError>;

    /// Replace the first record matching `predicate`, keeping its `id`
    async fn replace(
        &self,
        collection: &str,
        predicate: Predicate<'_>,
        record: Record,
    ) -> Result<Option<Record>, StoreError>;

    /// Remove every record matching `predicate`, returning how many went
    async fn remove(&self, collection: &str, predicate: Predicate<'_>)
    -> Result<usize, StoreError>;

    /// Rewrite the whole document to durable storage (no-op for memory stores)
    async fn persist(&self) -> Result<(), StoreError>;
}
