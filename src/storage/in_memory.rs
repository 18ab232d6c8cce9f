//! In-memory implementation of RecordStore for testing and development

use crate::core::error::StoreError;
use crate::core::record::{CART, PRODUCTS, Record};
use crate::core::store::{Predicate, RecordStore};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// In-memory record store
///
/// Holds the whole document behind one `RwLock`; every mutation takes the
/// write lock once, so a find-then-update never interleaves with another
/// writer.
#[derive(Clone)]
pub struct InMemoryStore {
    document: Arc<RwLock<Map<String, Value>>>,
}

impl InMemoryStore {
    /// Create a store with empty `products` and `cart` collections
    pub fn new() -> Self {
        Self::from_map(empty_document())
    }

    /// Create a store from an existing JSON document
    ///
    /// The document must be a JSON object; each array member is a collection.
    pub fn from_document(document: Value) -> Result<Self, StoreError> {
        match document {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(StoreError::InvalidDocument(format!(
                "expected an object of collections, found {}",
                kind(&other)
            ))),
        }
    }

    fn from_map(map: Map<String, Value>) -> Self {
        Self {
            document: Arc::new(RwLock::new(map)),
        }
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, Map<String, Value>>, StoreError> {
        self.document
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, Map<String, Value>>, StoreError> {
        self.document
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Document a fresh store starts from
pub(crate) fn empty_document() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(PRODUCTS.to_string(), Value::Array(Vec::new()));
    map.insert(CART.to_string(), Value::Array(Vec::new()));
    map
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn collection_mut<'a>(
    document: &'a mut Map<String, Value>,
    collection: &str,
) -> Option<&'a mut Vec<Value>> {
    document.get_mut(collection).and_then(Value::as_array_mut)
}

/// Identifier for a record appended to `records`
///
/// Falls back to a UUID when an id is non-numeric or the numeric ids are
/// exhausted.
fn next_id(records: &[Record]) -> Value {
    let ids: Option<Vec<u64>> = records
        .iter()
        .filter_map(|record| record.get("id"))
        .map(Value::as_u64)
        .collect();

    match ids.and_then(|ids| ids.into_iter().max().unwrap_or(0).checked_add(1)) {
        Some(id) => Value::from(id),
        None => Value::String(Uuid::new_v4().to_string()),
    }
}

// Mutations on a locked document, shared with the file-backed store.

pub(crate) fn collection_snapshot(
    document: &Map<String, Value>,
    collection: &str,
) -> Option<Vec<Record>> {
    document
        .get(collection)
        .and_then(Value::as_array)
        .cloned()
}

pub(crate) fn insert_record(
    document: &mut Map<String, Value>,
    collection: &str,
    mut record: Record,
) -> Result<Record, StoreError> {
    let entry = document
        .entry(collection.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    let records = match entry {
        Value::Array(records) => records,
        other => {
            return Err(StoreError::InvalidDocument(format!(
                "'{}' is {}, not a collection",
                collection,
                kind(other)
            )));
        }
    };

    if let Some(fields) = record.as_object_mut() {
        if !fields.contains_key("id") {
            fields.insert("id".to_string(), next_id(records));
        }
    }

    records.push(record.clone());
    Ok(record)
}

pub(crate) fn update_record(
    document: &mut Map<String, Value>,
    collection: &str,
    predicate: Predicate<'_>,
    patch: Map<String, Value>,
) -> Option<Record> {
    let record = collection_mut(document, collection)?
        .iter_mut()
        .find(|r| predicate(&**r))?;

    if !record.is_object() {
        *record = Value::Object(Map::new());
    }
    if let Some(fields) = record.as_object_mut() {
        fields.extend(patch);
    }
    Some(record.clone())
}

pub(crate) fn replace_record(
    document: &mut Map<String, Value>,
    collection: &str,
    predicate: Predicate<'_>,
    replacement: Record,
) -> Option<Record> {
    let record = collection_mut(document, collection)?
        .iter_mut()
        .find(|r| predicate(&**r))?;

    let id = record.get("id").cloned();
    *record = replacement;
    if let (Some(id), Some(fields)) = (id, record.as_object_mut()) {
        fields.insert("id".to_string(), id);
    }
    Some(record.clone())
}

pub(crate) fn remove_records(
    document: &mut Map<String, Value>,
    collection: &str,
    predicate: Predicate<'_>,
) -> usize {
    let Some(records) = collection_mut(document, collection) else {
        return 0;
    };

    let before = records.len();
    records.retain(|record| !predicate(record));
    before - records.len()
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn document(&self) -> Result<Value, StoreError> {
        Ok(Value::Object(self.read()?.clone()))
    }

    async fn snapshot(&self, collection: &str) -> Result<Option<Vec<Record>>, StoreError> {
        Ok(collection_snapshot(&*self.read()?, collection))
    }

    async fn find_index(
        &self,
        collection: &str,
        predicate: Predicate<'_>,
    ) -> Result<Option<usize>, StoreError> {
        let document = self.read()?;
        Ok(document
            .get(collection)
            .and_then(Value::as_array)
            .and_then(|records| records.iter().position(|r| predicate(r))))
    }

    async fn insert(&self, collection: &str, record: Record) -> Result<Record, StoreError> {
        insert_record(&mut *self.write()?, collection, record)
    }

    async fn update(
        &self,
        collection: &str,
        predicate: Predicate<'_>,
        patch: Map<String, Value>,
    ) -> Result<Option<Record>, StoreError> {
        Ok(update_record(&mut *self.write()?, collection, predicate, patch))
    }

    async fn update_and_list(
        &self,
        collection: &str,
        predicate: Predicate<'_>,
        patch: Map<String, Value>,
    ) -> Result<Option<Vec<Record>>, StoreError> {
        let mut document = self.write()?;
        if update_record(&mut document, collection, predicate, patch).is_none() {
            return Ok(None);
        }
        Ok(collection_snapshot(&document, collection))
    }

    async fn replace(
        &self,
        collection: &str,
        predicate: Predicate<'_>,
        replacement: Record,
    ) -> Result<Option<Record>, StoreError> {
        Ok(replace_record(&mut *self.write()?, collection, predicate, replacement))
    }

    async fn remove(
        &self,
        collection: &str,
        predicate: Predicate<'_>,
    ) -> Result<usize, StoreError> {
        Ok(remove_records(&mut *self.write()?, collection, predicate))
    }

    async fn persist(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
