//! In-process document backend.
//!
//! Keeps collections in insertion order behind a mutex. Used by tests and
//! for embedding; it can simulate an outage and add per-call latency.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use super::{new_document_key, Document, DocumentBackend, StoredDocument};
use crate::error::{Error, Result};

/// Document backend held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    collections: Mutex<HashMap<String, Vec<StoredDocument>>>,
    unavailable: AtomicBool,
    latency: Option<Duration>,
    list_calls: AtomicUsize,
}

impl InMemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency` before it touches the data.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every subsequent call fail as if the store were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `list` calls served so far.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    async fn enter(&self, operation: &'static str) -> Result<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::unavailable(operation, "in-memory store is offline"));
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<StoredDocument>>>> {
        self.collections
            .lock()
            .map_err(|_| Error::internal("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl DocumentBackend for InMemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>> {
        self.enter("list").await?;
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let collections = self.lock()?;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    async fn insert(&self, collection: &str, body: Document) -> Result<String> {
        self.enter("create").await?;
        let key = new_document_key();
        self.lock()?
            .entry(collection.to_string())
            .or_default()
            .push(StoredDocument {
                key: key.clone(),
                body,
            });
        Ok(key)
    }

    async fn merge(&self, collection: &str, key: &str, fields: Document) -> Result<()> {
        self.enter("update").await?;
        let mut collections = self.lock()?;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.key == key))
            .ok_or_else(|| Error::not_found(key))?;
        doc.body.extend(fields);
        Ok(())
    }

    async fn remove(&self, collection: &str, key: &str) -> Result<()> {
        self.enter("delete").await?;
        let mut collections = self.lock()?;
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| Error::not_found(key))?;
        let position = docs
            .iter()
            .position(|d| d.key == key)
            .ok_or_else(|| Error::not_found(key))?;
        docs.remove(position);
        Ok(())
    }
}
