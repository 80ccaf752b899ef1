//! Record store client for staffdesk.
//!
//! Persistence is delegated to a schemaless document backend addressed by
//! collection name and store-assigned key. [`RecordStore`] is the thin
//! façade the application talks to: it issues the four logical calls
//! (list, create, update, delete) and normalizes stored documents into
//! [`StaffRecord`] rows.
//!
//! A staff document has the shape
//! `{"id": "S1", "fullName": "Ann Lee", "birthday": "1990-01-01", "gender": 1}`.
//! The numeric gender lives under `gender`; the key is not part of the body.

pub mod memory;
pub mod migrations;
pub mod schema;
pub mod sqlite;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::record::{Gender, StaffInput, StaffPatch, StaffRecord, DATE_FORMAT};

pub use memory::InMemoryBackend;
pub use sqlite::SqliteBackend;

/// Default name of the staff collection.
pub const DEFAULT_COLLECTION: &str = "staff";

/// A schemaless document body.
pub type Document = Map<String, Value>;

/// A document together with the key the backend assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Store-assigned key.
    pub key: String,
    /// Document body.
    pub body: Document,
}

/// A document database holding named collections of schemaless documents.
///
/// Implementations report a missing key as [`Error::NotFound`] and any
/// other failure as [`Error::StoreUnavailable`].
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// The name of this backend (for logging).
    fn name(&self) -> &'static str;

    /// Return every document in a collection in the backend's native order.
    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>>;

    /// Add a document and return the key assigned to it.
    async fn insert(&self, collection: &str, body: Document) -> Result<String>;

    /// Overwrite the given fields of an existing document, leaving others alone.
    async fn merge(&self, collection: &str, key: &str, fields: Document) -> Result<()>;

    /// Remove a document.
    async fn remove(&self, collection: &str, key: &str) -> Result<()>;
}

/// Generate a fresh document key.
pub(crate) fn new_document_key() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Façade issuing staff record calls against a document backend.
#[derive(Debug)]
pub struct RecordStore<B> {
    backend: B,
    collection: String,
}

impl<B: DocumentBackend> RecordStore<B> {
    /// Create a client for the default `staff` collection.
    pub fn new(backend: B) -> Self {
        Self::with_collection(backend, DEFAULT_COLLECTION)
    }

    /// Create a client for a named collection.
    pub fn with_collection(backend: B, collection: impl Into<String>) -> Self {
        Self {
            backend,
            collection: collection.into(),
        }
    }

    /// The collection this client addresses.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The underlying backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// List every staff record in store order.
    ///
    /// Documents that do not have the staff shape are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the backend call fails.
    pub async fn list_all(&self) -> Result<Vec<StaffRecord>> {
        let documents = self
            .backend
            .list(&self.collection)
            .await
            .map_err(|e| classify("list", e))?;

        let mut records = Vec::with_capacity(documents.len());
        for doc in documents {
            match document_to_record(&doc) {
                Ok(record) => records.push(record),
                Err(reason) => warn!(key = %doc.key, "Skipping malformed staff document: {reason}"),
            }
        }
        debug!(
            "Listed {} staff records from {}",
            records.len(),
            self.backend.name()
        );
        Ok(records)
    }

    /// Persist a new record and return its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the backend call fails.
    pub async fn create(&self, input: &StaffInput) -> Result<String> {
        let data_id = self
            .backend
            .insert(&self.collection, input_to_document(input))
            .await
            .map_err(|e| classify("create", e))?;
        debug!(%data_id, id = %input.id, "Created staff record");
        Ok(data_id)
    }

    /// Overwrite the fields present in `patch` on the record at `data_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the record does not exist and
    /// [`Error::StoreUnavailable`] if the backend call fails.
    pub async fn update(&self, data_id: &str, patch: &StaffPatch) -> Result<()> {
        self.backend
            .merge(&self.collection, data_id, patch_to_document(patch))
            .await
            .map_err(|e| classify("update", e))?;
        debug!(%data_id, "Updated staff record");
        Ok(())
    }

    /// Remove the record at `data_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the record does not exist and
    /// [`Error::StoreUnavailable`] if the backend call fails.
    pub async fn delete(&self, data_id: &str) -> Result<()> {
        self.backend
            .remove(&self.collection, data_id)
            .await
            .map_err(|e| classify("delete", e))?;
        debug!(%data_id, "Deleted staff record");
        Ok(())
    }
}

/// Keep `NotFound` and `StoreUnavailable` as-is; anything else the backend
/// raised is a store failure for this operation.
fn classify(operation: &'static str, err: Error) -> Error {
    match err {
        Error::NotFound { .. } | Error::StoreUnavailable { .. } => err,
        other => Error::unavailable(operation, other),
    }
}

/// Build the stored document for a new record.
#[must_use]
pub fn input_to_document(input: &StaffInput) -> Document {
    patch_to_document(&StaffPatch::from(input.clone()))
}

/// Build the field set an update overwrites.
#[must_use]
pub fn patch_to_document(patch: &StaffPatch) -> Document {
    let mut doc = Document::new();
    if let Some(id) = &patch.id {
        doc.insert("id".into(), Value::from(id.as_str()));
    }
    if let Some(full_name) = &patch.full_name {
        doc.insert("fullName".into(), Value::from(full_name.as_str()));
    }
    if let Some(birthday) = &patch.birthday {
        doc.insert(
            "birthday".into(),
            Value::from(birthday.format(DATE_FORMAT).to_string()),
        );
    }
    if let Some(gender) = patch.gender {
        doc.insert("gender".into(), Value::from(gender.code()));
    }
    doc
}

/// Normalize a stored document into a listing row.
///
/// # Errors
///
/// Returns a description of the first field that does not fit the staff shape.
pub fn document_to_record(doc: &StoredDocument) -> std::result::Result<StaffRecord, String> {
    let text = |name: &str| -> std::result::Result<String, String> {
        doc.body
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| format!("missing or non-text field '{name}'"))
    };

    let id = text("id")?;
    let full_name = text("fullName")?;
    let birthday_text = text("birthday")?;
    let birthday = NaiveDate::parse_from_str(&birthday_text, DATE_FORMAT)
        .map_err(|e| format!("unparseable birthday '{birthday_text}': {e}"))?;
    let gender = doc
        .body
        .get("gender")
        .and_then(Value::as_i64)
        .and_then(Gender::from_code)
        .ok_or_else(|| "missing or unknown gender code".to_string())?;

    Ok(StaffRecord {
        data_id: doc.key.clone(),
        id,
        full_name,
        birthday,
        gender,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_input() -> StaffInput {
        StaffInput {
            id: "S1".to_string(),
            full_name: "Ann Lee".to_string(),
            birthday: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            gender: Gender::Male,
        }
    }

    fn stored(body: Value) -> StoredDocument {
        StoredDocument {
            key: "k1".to_string(),
            body: body.as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn test_input_to_document_shape() {
        let doc = input_to_document(&sample_input());
        assert_eq!(
            Value::Object(doc),
            json!({"id": "S1", "fullName": "Ann Lee", "birthday": "1990-01-01", "gender": 1})
        );
    }

    #[test]
    fn test_partial_patch_document() {
        let patch = StaffPatch {
            full_name: Some("Ann Lee-Smith".to_string()),
            ..StaffPatch::default()
        };
        let doc = patch_to_document(&patch);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc["fullName"], "Ann Lee-Smith");
    }

    #[test]
    fn test_document_to_record() {
        let doc = stored(
            json!({"id": "S2", "fullName": "Bo Tan", "birthday": "1991-02-02", "gender": 2}),
        );
        let record = document_to_record(&doc).unwrap();
        assert_eq!(record.data_id, "k1");
        assert_eq!(record.id, "S2");
        assert_eq!(record.gender, Gender::Female);
        assert_eq!(record.gender_label(), "Female");
    }

    #[test]
    fn test_document_extra_fields_ignored() {
        let doc = stored(json!({
            "id": "S2", "fullName": "Bo Tan", "birthday": "1991-02-02",
            "gender": 2, "department": "ops"
        }));
        assert!(document_to_record(&doc).is_ok());
    }

    #[test]
    fn test_document_unknown_gender_rejected() {
        let doc = stored(
            json!({"id": "S2", "fullName": "Bo Tan", "birthday": "1991-02-02", "gender": 7}),
        );
        let reason = document_to_record(&doc).unwrap_err();
        assert!(reason.contains("gender"));
    }

    #[test]
    fn test_document_missing_field_rejected() {
        let doc = stored(json!({"id": "S2", "birthday": "1991-02-02", "gender": 1}));
        let reason = document_to_record(&doc).unwrap_err();
        assert!(reason.contains("fullName"));
    }

    #[test]
    fn test_document_bad_birthday_rejected() {
        let doc = stored(json!({"id": "S2", "fullName": "Bo", "birthday": "02/02/1991", "gender": 1}));
        let reason = document_to_record(&doc).unwrap_err();
        assert!(reason.contains("birthday"));
    }

    #[test]
    fn test_classify_keeps_domain_errors() {
        assert!(classify("update", Error::not_found("x")).is_not_found());
        assert!(classify("list", Error::unavailable("list", "down")).is_unavailable());
        assert!(classify("list", Error::internal("poisoned")).is_unavailable());
    }

    #[test]
    fn test_new_document_key_is_unique() {
        let a = new_document_key();
        let b = new_document_key();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_round_trip_through_memory_backend() {
        let store = RecordStore::new(InMemoryBackend::new());
        let data_id = store.create(&sample_input()).await.unwrap();

        let records = store.list_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data_id, data_id);
        assert_eq!(records[0].to_input(), sample_input());
        assert_eq!(records[0].gender_label(), "Male");
    }

    #[tokio::test]
    async fn test_list_skips_malformed_documents() {
        let backend = InMemoryBackend::new();
        backend
            .insert(DEFAULT_COLLECTION, json!({"note": "not staff"}).as_object().cloned().unwrap())
            .await
            .unwrap();
        let store = RecordStore::new(backend);
        store.create(&sample_input()).await.unwrap();

        let records = store.list_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "S1");
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = RecordStore::new(InMemoryBackend::new());
        let data_id = store.create(&sample_input()).await.unwrap();

        let patch = StaffPatch {
            full_name: Some("Ann Lee-Smith".to_string()),
            ..StaffPatch::default()
        };
        store.update(&data_id, &patch).await.unwrap();

        let records = store.list_all().await.unwrap();
        assert_eq!(records[0].data_id, data_id);
        assert_eq!(records[0].full_name, "Ann Lee-Smith");
        assert_eq!(records[0].id, "S1");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = RecordStore::new(InMemoryBackend::new());
        let err = store
            .update("missing", &StaffPatch::from(sample_input()))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let store = RecordStore::new(InMemoryBackend::new());
        let data_id = store.create(&sample_input()).await.unwrap();

        store.delete(&data_id).await.unwrap();
        let err = store.delete(&data_id).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_backend() {
        let backend = InMemoryBackend::new();
        backend.set_unavailable(true);
        let store = RecordStore::new(backend);

        assert!(store.list_all().await.unwrap_err().is_unavailable());
        assert!(store.create(&sample_input()).await.unwrap_err().is_unavailable());
        assert!(store.delete("k").await.unwrap_err().is_unavailable());
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let backend = InMemoryBackend::new();
        let store = RecordStore::with_collection(backend, "contractors");
        store.create(&sample_input()).await.unwrap();
        assert_eq!(store.collection(), "contractors");
        assert!(store
            .backend()
            .list(DEFAULT_COLLECTION)
            .await
            .unwrap()
            .is_empty());
    }
}
