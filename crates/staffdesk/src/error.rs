//! Error types for staffdesk.
//!
//! This module defines all error types used throughout the staffdesk crate.
//! The three domain failures a user can see are validation errors (shown
//! inline on the edit form), an unavailable store, and a record that has
//! vanished between listing and mutation.

use std::path::PathBuf;
use thiserror::Error;

use crate::validate::ValidationErrors;

/// The main error type for staffdesk operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Domain Errors ===
    /// The submitted form failed field validation.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// The document store rejected or failed a call.
    #[error("store unavailable during {operation}: {message}")]
    StoreUnavailable {
        /// The store operation that failed (`list`, `create`, ...).
        operation: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// The addressed record no longer exists.
    #[error("staff record {data_id} not found")]
    NotFound {
        /// The store-assigned identifier that was addressed.
        data_id: String,
    },

    /// Another mutating action is still in flight.
    #[error("another action is still in progress")]
    Busy,

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Export Errors ===
    /// Writing an export file failed.
    #[error("failed to export {path}: {source}")]
    Export {
        /// Destination of the export.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for staffdesk operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl Error {
    /// Create a store-unavailable error for the given operation.
    #[must_use]
    pub fn unavailable(operation: &'static str, message: impl std::fmt::Display) -> Self {
        Self::StoreUnavailable {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a not-found error for the given store identifier.
    #[must_use]
    pub fn not_found(data_id: impl Into<String>) -> Self {
        Self::NotFound {
            data_id: data_id.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means the addressed record is gone.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error is a store failure.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }

    /// Check if this error is a form validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
