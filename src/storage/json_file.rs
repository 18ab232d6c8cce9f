//! Flat-file JSON record store
//!
//! The whole document is loaded into an [`InMemoryStore`] on open. Every
//! mutation is applied to a staged copy, written back in full, and only then
//! becomes visible, so a failed write leaves both the file and the served
//! document as they were. Writes go to a sibling temporary file which is then
//! renamed over the original, so a crash mid-write leaves the previous
//! document intact.

use crate::core::error::StoreError;
use crate::core::record::Record;
use crate::core::store::{Predicate, RecordStore};
use crate::storage::in_memory::{self, InMemoryStore, empty_document};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Record store backed by a single JSON file
#[derive(Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: InMemoryStore,

    /// Serializes full rewrites; concurrent writers would share the temp file
    flush: Arc<Mutex<()>>,
}

impl JsonFileStore {
    /// Open the document at `path`, creating it when missing
    ///
    /// A new file starts with empty `products` and `cart` collections.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let inner = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| io_error(&path, source))?;
            let document: Value = serde_json::from_str(&content)?;
            InMemoryStore::from_document(document)?
        } else {
            let store = InMemoryStore::from_document(Value::Object(empty_document()))?;
            write_document(&path, &empty_document())?;
            tracing::info!(path = %path.display(), "created new database file");
            store
        };

        let store = Self {
            path,
            inner,
            flush: Arc::new(Mutex::new(())),
        };
        tracing::info!(
            path = %store.path.display(),
            collections = ?store.collection_names()?,
            "opened database"
        );
        Ok(store)
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        let document = self.inner.read()?;
        Ok(document
            .iter()
            .filter(|(_, value)| value.is_array())
            .map(|(name, _)| name.clone())
            .collect())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn write_document(path: &Path, document: &Map<String, Value>) -> Result<(), StoreError> {
    let content = serde_json::to_string_pretty(document)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, content).map_err(|source| io_error(&tmp, source))?;
    fs::rename(&tmp, path).map_err(|source| io_error(path, source))
}

impl JsonFileStore {
    fn lock_flush(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.flush
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    /// Apply `mutate` to a staged copy, write it, then swap it in
    ///
    /// Nothing is written when the mutation leaves the document unchanged.
    fn commit<T>(
        &self,
        mutate: impl FnOnce(&mut Map<String, Value>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _flush = self.lock_flush()?;
        let mut document = self.inner.write()?;
        let mut staged = document.clone();
        let outcome = mutate(&mut staged)?;

        if staged != *document {
            write_document(&self.path, &staged)?;
            *document = staged;
            tracing::debug!(path = %self.path.display(), "committed database");
        }
        Ok(outcome)
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn document(&self) -> Result<Value, StoreError> {
        self.inner.document().await
    }

    async fn snapshot(&self, collection: &str) -> Result<Option<Vec<Record>>, StoreError> {
        self.inner.snapshot(collection).await
    }

    async fn find_index(
        &self,
        collection: &str,
        predicate: Predicate<'_>,
    ) -> Result<Option<usize>, StoreError> {
        self.inner.find_index(collection, predicate).await
    }

    async fn insert(&self, collection: &str, record: Record) -> Result<Record, StoreError> {
        self.commit(|document| in_memory::insert_record(document, collection, record))
    }

    async fn update(
        &self,
        collection: &str,
        predicate: Predicate<'_>,
        patch: Map<String, Value>,
    ) -> Result<Option<Record>, StoreError> {
        self.commit(|document| {
            Ok(in_memory::update_record(document, collection, predicate, patch))
        })
    }

    async fn update_and_list(
        &self,
        collection: &str,
        predicate: Predicate<'_>,
        patch: Map<String, Value>,
    ) -> Result<Option<Vec<Record>>, StoreError> {
        self.commit(|document| {
            Ok(
                in_memory::update_record(document, collection, predicate, patch)
                    .and_then(|_| in_memory::collection_snapshot(document, collection)),
            )
        })
    }

    async fn replace(
        &self,
        collection: &str,
        predicate: Predicate<'_>,
        record: Record,
    ) -> Result<Option<Record>, StoreError> {
        self.commit(|document| {
            Ok(in_memory::replace_record(document, collection, predicate, record))
        })
    }

    async fn remove(
        &self,
        collection: &str,
        predicate: Predicate<'_>,
    ) -> Result<usize, StoreError> {
        self.commit(|document| Ok(in_memory::remove_records(document, collection, predicate)))
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let _flush = self.lock_flush()?;
        // Copy under the read lock so the file reflects one consistent state.
        let document = self.inner.read()?.clone();
        write_document(&self.path, &document)?;
        tracing::debug!(path = %self.path.display(), "persisted database");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::field_equals;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_creates_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");

        let store = JsonFileStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.snapshot("products").await.unwrap(), Some(vec![]));

        let on_disk: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, json!({"products": [], "cart": []}));
    }

    #[tokio::test]
    async fn test_open_reads_existing_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, r#"{"products": [{"id": 1, "name": "Phone"}], "cart": []}"#).unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        let products = store.snapshot("products").await.unwrap().unwrap();
        assert_eq!(products, vec![json!({"id": 1, "name": "Phone"})]);
    }

    #[test]
    fn test_open_rejects_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_open_rejects_non_object_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, "[]").unwrap();

        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::InvalidDocument(_))
        ));
    }

    fn on_disk(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_mutations_are_written_through() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        let store = JsonFileStore::open(&path).unwrap();

        store
            .insert("cart", json!({"productId": "p1", "quantity": 2}))
            .await
            .unwrap();
        assert_eq!(
            on_disk(&path)["cart"],
            json!([{"productId": "p1", "quantity": 2, "id": 1}])
        );

        let mut patch = Map::new();
        patch.insert("quantity".into(), json!(5));
        let cart = store
            .update_and_list("cart", &|r| field_equals(r, "productId", "p1"), patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cart[0]["quantity"], 5);
        assert_eq!(on_disk(&path)["cart"][0]["quantity"], 5);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_document_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        let store = JsonFileStore::open(&path).unwrap();

        // A directory in the temp file's place makes every write fail
        fs::create_dir(dir.path().join("db.json.tmp")).unwrap();

        let result = store.insert("cart", json!({"productId": "p1"})).await;
        assert!(matches!(result, Err(StoreError::Io { .. })));
        assert_eq!(store.snapshot("cart").await.unwrap(), Some(vec![]));
        assert_eq!(on_disk(&path)["cart"], json!([]));
    }

    #[tokio::test]
    async fn test_reopen_sees_persisted_removal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(
            &path,
            r#"{"products": [{"productId": "7"}, {"productId": "8"}], "cart": []}"#,
        )
        .unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        store
            .remove("products", &|r| field_equals(r, "productId", "7"))
            .await
            .unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        let products = reopened.snapshot("products").await.unwrap().unwrap();
        assert_eq!(products, vec![json!({"productId": "8"})]);
    }

    #[tokio::test]
    async fn test_persist_rewrites_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        let store = JsonFileStore::open(&path).unwrap();
        fs::write(&path, "{}").unwrap();

        store.persist().await.unwrap();
        assert_eq!(on_disk(&path), json!({"products": [], "cart": []}));
    }
}
