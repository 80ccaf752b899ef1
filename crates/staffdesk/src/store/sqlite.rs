//! `SQLite`-backed document backend.
//!
//! Stores each document as JSON text keyed by collection and a
//! store-assigned id, so the application sees the same schemaless
//! collection model a hosted document database offers. Statements run on
//! tokio's blocking pool.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::{migrations, new_document_key, Document, DocumentBackend, StoredDocument};
use crate::error::{Error, Result};

/// Document backend persisted in a `SQLite` database file.
#[derive(Debug)]
pub struct SqliteBackend {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection, shared with blocking tasks.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBackend {
    /// Open or create a document database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist
    /// and brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening document store at {}", path.display());
        let mut conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&mut conn)?;

        info!("Document store opened at {}", path.display());
        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database, mainly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        migrations::initialize_schema(&mut conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Count the documents in a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self, collection: &str) -> Result<i64> {
        let conn = lock(&self.conn)?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            [collection],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Run a statement on the blocking pool and classify its failure.
    async fn run<T, F>(&self, operation: &'static str, task: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Mutex<Connection>) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let result = match tokio::task::spawn_blocking(move || task(&*conn)).await {
            Ok(result) => result,
            Err(err) => Err(Error::internal(format!("store task failed: {err}"))),
        };
        result.map_err(|e| store_error(operation, e))
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| Error::internal("document store connection lock poisoned"))
}

fn list_documents(conn: &Mutex<Connection>, collection: &str) -> Result<Vec<StoredDocument>> {
    let conn = lock(conn)?;
    let mut stmt =
        conn.prepare("SELECT doc_id, body FROM documents WHERE collection = ?1 ORDER BY seq")?;
    let rows = stmt
        .query_map([collection], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(key, body)| {
            let body: Document = serde_json::from_str(&body)?;
            Ok(StoredDocument { key, body })
        })
        .collect()
}

fn insert_document(conn: &Mutex<Connection>, collection: &str, body: &Document) -> Result<String> {
    let key = new_document_key();
    let body = serde_json::to_string(body)?;
    lock(conn)?.execute(
        "INSERT INTO documents (collection, doc_id, body) VALUES (?1, ?2, ?3)",
        params![collection, key, body],
    )?;
    Ok(key)
}

fn merge_document(
    conn: &Mutex<Connection>,
    collection: &str,
    key: &str,
    fields: Document,
) -> Result<()> {
    let conn = lock(conn)?;
    let current: Option<String> = conn
        .query_row(
            "SELECT body FROM documents WHERE collection = ?1 AND doc_id = ?2",
            params![collection, key],
            |row| row.get(0),
        )
        .optional()?;
    let current = current.ok_or_else(|| Error::not_found(key))?;

    let mut body: Document = serde_json::from_str(&current)?;
    body.extend(fields);
    conn.execute(
        r"
        UPDATE documents SET body = ?3, updated_at = datetime('now')
        WHERE collection = ?1 AND doc_id = ?2
        ",
        params![collection, key, serde_json::to_string(&body)?],
    )?;
    Ok(())
}

fn remove_document(conn: &Mutex<Connection>, collection: &str, key: &str) -> Result<()> {
    let affected = lock(conn)?.execute(
        "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2",
        params![collection, key],
    )?;
    if affected == 0 {
        return Err(Error::not_found(key));
    }
    Ok(())
}

/// Store-level failures become `StoreUnavailable`; a missing key stays `NotFound`.
fn store_error(operation: &'static str, err: Error) -> Error {
    if err.is_not_found() {
        err
    } else {
        Error::unavailable(operation, err)
    }
}

#[async_trait]
impl DocumentBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>> {
        let collection = collection.to_string();
        self.run("list", move |conn| list_documents(conn, &collection))
            .await
    }

    async fn insert(&self, collection: &str, body: Document) -> Result<String> {
        let collection = collection.to_string();
        self.run("create", move |conn| insert_document(conn, &collection, &body))
            .await
    }

    async fn merge(&self, collection: &str, key: &str, fields: Document) -> Result<()> {
        let (collection, key) = (collection.to_string(), key.to_string());
        self.run("update", move |conn| {
            merge_document(conn, &collection, &key, fields)
        })
        .await
    }

    async fn remove(&self, collection: &str, key: &str) -> Result<()> {
        let (collection, key) = (collection.to_string(), key.to_string());
        self.run("delete", move |conn| remove_document(conn, &collection, &key))
            .await
    }
}
