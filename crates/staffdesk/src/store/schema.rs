//! `SQLite` schema definitions for the document backend.
//!
//! Documents of every collection share one table; each row carries the
//! collection name, the store-assigned key and the JSON body. `seq` gives
//! the native (insertion) order used when listing.

/// SQL statement to create the documents table.
pub const CREATE_DOCUMENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS documents (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    doc_id TEXT NOT NULL,
    body TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the unique index addressing a document by key.
pub const CREATE_KEY_INDEX: &str = r"
CREATE UNIQUE INDEX IF NOT EXISTS idx_documents_key ON documents(collection, doc_id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_DOCUMENTS_TABLE,
    CREATE_KEY_INDEX,
    CREATE_METADATA_TABLE,
];
