//! `staffdesk` - Staff records manager backed by a document store
//!
//! This library provides the record store client, form validation, the
//! add/edit dialog, the listing view with its actions, notifications and
//! CSV/PDF export used by the `staffdesk` binary.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod app;
pub mod cli;
pub mod config;
pub mod dialog;
pub mod error;
pub mod export;
pub mod logging;
pub mod notify;
pub mod record;
pub mod store;
pub mod validate;

pub use app::{ActionOutcome, ActionPhase, StaffApp, ViewSnapshot};
pub use config::Config;
pub use dialog::{EditDialog, SaveEvent};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{Gender, StaffInput, StaffRecord};
pub use store::{DocumentBackend, InMemoryBackend, RecordStore, SqliteBackend};
pub use validate::{validate, ValidationErrors};
