//! Listing view state and the actions that mutate it.
//!
//! [`StaffApp`] owns the row set, the edit dialog, the notification surface
//! and the quick filter. Front-ends read [`ViewSnapshot`]s and change state
//! only through the actions below. Every mutating action follows the same
//! cycle: mark the phase as submitting, call the store, reload the listing
//! on success, show a notification, and return to idle. Only one mutating
//! action may be in flight at a time; a second one is rejected as busy.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::dialog::{EditDialog, SaveEvent};
use crate::error::{Error, Result};
use crate::export::{self, CsvStyle, ExportFormat, ExportRow};
use crate::notify::{Notification, NotificationSurface};
use crate::record::{StaffPatch, StaffRecord};
use crate::store::{DocumentBackend, RecordStore};
use crate::validate::{self, StaffForm};

/// Message shown after a record was created.
pub const CREATED_MESSAGE: &str = "Staff created successfully";
/// Message shown after a record was updated.
pub const UPDATED_MESSAGE: &str = "Staff updated successfully";
/// Message shown after a record was deleted.
pub const DELETED_MESSAGE: &str = "Staff deleted successfully";

/// The kind of mutating action being submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Creating a record.
    Create,
    /// Updating a record.
    Update,
    /// Deleting a record.
    Delete,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Whether a mutating action is outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActionPhase {
    /// Nothing in flight.
    #[default]
    Idle,
    /// A store call for the given action is outstanding.
    Submitting(ActionKind),
}

/// Result of an action.
#[derive(Debug)]
#[must_use]
pub enum ActionOutcome {
    /// The action completed.
    Succeeded,
    /// The action failed; the error was also surfaced as a notification
    /// (validation errors are shown on the form instead).
    Failed(Error),
    /// Another mutating action was still in flight; nothing was done.
    Busy,
}

impl ActionOutcome {
    /// Check whether the action completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// The failure, if the action failed.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Convert into a `Result`, treating `Busy` as [`Error::Busy`].
    ///
    /// # Errors
    ///
    /// Returns the failure of a failed or rejected action.
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Succeeded => Ok(()),
            Self::Failed(err) => Err(err),
            Self::Busy => Err(Error::Busy),
        }
    }
}

#[derive(Debug)]
struct AppState {
    rows: Arc<[StaffRecord]>,
    dialog: EditDialog,
    notifications: NotificationSurface,
    phase: ActionPhase,
    filter: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            rows: Arc::from(Vec::new()),
            dialog: EditDialog::default(),
            notifications: NotificationSurface::default(),
            phase: ActionPhase::Idle,
            filter: String::new(),
        }
    }
}

/// An immutable view of the application state.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    /// Every loaded record, in store order.
    pub rows: Arc<[StaffRecord]>,
    /// The quick filter text.
    pub filter: String,
    /// The edit dialog.
    pub dialog: EditDialog,
    /// The notification currently visible, if any.
    pub notification: Option<Notification>,
    /// Whether an action is in flight.
    pub phase: ActionPhase,
}

impl ViewSnapshot {
    /// The rows matching the quick filter.
    #[must_use]
    pub fn visible_rows(&self) -> Vec<&StaffRecord> {
        self.rows
            .iter()
            .filter(|record| matches_filter(record, &self.filter))
            .collect()
    }
}

/// Check whether a record matches a quick-filter query.
///
/// The query is split on whitespace; every term must appear,
/// case-insensitively, in at least one of the id, full name, birthday or
/// gender label. An empty query matches everything.
#[must_use]
pub fn matches_filter(record: &StaffRecord, query: &str) -> bool {
    let columns = [
        record.id.to_lowercase(),
        record.full_name.to_lowercase(),
        record.birthday_text(),
        record.gender_label().to_lowercase(),
    ];
    query.split_whitespace().all(|term| {
        let term = term.to_lowercase();
        columns.iter().any(|column| column.contains(&term))
    })
}

fn lock_state(state: &Mutex<AppState>) -> MutexGuard<'_, AppState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks a mutating action as submitting for as long as it is alive.
///
/// Dropping the guard returns the phase to idle and clears the in-flight
/// flag, including when the action future is cancelled mid-await.
struct InFlight<'a> {
    flag: &'a AtomicBool,
    state: &'a Mutex<AppState>,
}

impl<'a> InFlight<'a> {
    fn acquire(
        flag: &'a AtomicBool,
        state: &'a Mutex<AppState>,
        kind: ActionKind,
    ) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        debug!(%kind, "Submitting staff action");
        lock_state(state).phase = ActionPhase::Submitting(kind);
        Some(Self { flag, state })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock_state(self.state).phase = ActionPhase::Idle;
        self.flag.store(false, Ordering::Release);
    }
}

/// The staff listing with its dialog, notifications and actions.
#[derive(Debug)]
pub struct StaffApp<B> {
    store: RecordStore<B>,
    state: Mutex<AppState>,
    in_flight: AtomicBool,
    csv_style: CsvStyle,
}

impl<B: DocumentBackend> StaffApp<B> {
    /// Create an app over a record store with an empty listing.
    pub fn new(store: RecordStore<B>) -> Self {
        Self {
            store,
            state: Mutex::new(AppState::default()),
            in_flight: AtomicBool::new(false),
            csv_style: CsvStyle::default(),
        }
    }

    /// Set how long notifications stay visible.
    #[must_use]
    pub fn with_auto_hide(mut self, auto_hide: Duration) -> Self {
        self.state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .notifications = NotificationSurface::new(auto_hide);
        self
    }

    /// Set how CSV exports are written.
    #[must_use]
    pub fn with_csv_style(mut self, style: CsvStyle) -> Self {
        self.csv_style = style;
        self
    }

    /// The underlying record store.
    #[must_use]
    pub fn store(&self) -> &RecordStore<B> {
        &self.store
    }

    fn state(&self) -> MutexGuard<'_, AppState> {
        lock_state(&self.state)
    }

    fn begin(&self, kind: ActionKind) -> Option<InFlight<'_>> {
        InFlight::acquire(&self.in_flight, &self.state, kind)
    }

    /// Take a snapshot of the current view.
    #[must_use]
    pub fn snapshot(&self) -> ViewSnapshot {
        let state = self.state();
        ViewSnapshot {
            rows: Arc::clone(&state.rows),
            filter: state.filter.clone(),
            dialog: state.dialog.clone(),
            notification: state.notifications.current().cloned(),
            phase: state.phase,
        }
    }

    /// The rows matching the quick filter, in store order.
    #[must_use]
    pub fn visible_rows(&self) -> Vec<StaffRecord> {
        let state = self.state();
        state
            .rows
            .iter()
            .filter(|record| matches_filter(record, &state.filter))
            .cloned()
            .collect()
    }

    /// Replace the quick filter.
    pub fn set_filter(&self, query: impl Into<String>) {
        self.state().filter = query.into();
    }

    /// Hide the current notification.
    pub fn dismiss_notification(&self) {
        self.state().notifications.dismiss();
    }

    /// Fetch the full listing from the store.
    ///
    /// On failure the previous rows stay in place and an error notification
    /// is shown.
    pub async fn load(&self) -> ActionOutcome {
        match self.reload().await {
            Ok(count) => {
                debug!("Loaded {count} staff records");
                ActionOutcome::Succeeded
            }
            Err(err) => {
                warn!("Failed to load staff list: {err}");
                self.state()
                    .notifications
                    .error(format!("Failed to load staff: {err}"));
                ActionOutcome::Failed(err)
            }
        }
    }

    /// Open the dialog for a new record.
    pub fn open_add_dialog(&self) {
        self.state().dialog.open(None);
    }

    /// Open the dialog for the loaded record with the given store id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no loaded row has that id.
    pub fn open_edit_dialog(&self, data_id: &str) -> Result<()> {
        let mut state = self.state();
        let record = state
            .rows
            .iter()
            .find(|record| record.data_id == data_id)
            .cloned()
            .ok_or_else(|| Error::not_found(data_id))?;
        state.dialog.open(Some(&record));
        Ok(())
    }

    /// Apply edits to the open dialog.
    pub fn update_dialog<F>(&self, edit: F)
    where
        F: FnOnce(&mut EditDialog),
    {
        edit(&mut self.state().dialog);
    }

    /// Cancel the dialog, discarding its contents.
    pub fn close_dialog(&self) {
        self.state().dialog.close();
    }

    /// Validate the dialog and save it.
    ///
    /// Invalid input fails with [`Error::Validation`] without touching the
    /// store; the dialog then shows the messages on every field.
    pub async fn submit_dialog(&self) -> ActionOutcome {
        let submitted = self.state().dialog.submit();
        match submitted {
            Ok(event) => self.save(event).await,
            Err(errors) => {
                debug!("Dialog submission rejected: {errors}");
                ActionOutcome::Failed(Error::Validation(errors))
            }
        }
    }

    /// Create or update a record from a dialog submission.
    ///
    /// Creates when the event carries no store id, updates otherwise. The
    /// input is validated again first; invalid input fails with
    /// [`Error::Validation`] and the store is not called. On success the
    /// listing is reloaded and the dialog closed; on failure the rows stay
    /// unchanged and the dialog stays open.
    pub async fn save(&self, event: SaveEvent) -> ActionOutcome {
        let input = match validate::validate(&StaffForm::from(&event.input)) {
            Ok(input) => input,
            Err(errors) => {
                debug!("Save rejected: {errors}");
                return ActionOutcome::Failed(Error::Validation(errors));
            }
        };

        let kind = if event.data_id.is_some() {
            ActionKind::Update
        } else {
            ActionKind::Create
        };
        let Some(_guard) = self.begin(kind) else {
            return self.reject_busy();
        };
        self.warn_duplicate_id(event.data_id.as_deref(), &input.id);

        let result = match &event.data_id {
            None => self.store.create(&input).await.map(|data_id| {
                info!(%data_id, id = %input.id, "Created staff record");
            }),
            Some(data_id) => self
                .store
                .update(data_id, &StaffPatch::from(input))
                .await
                .map(|()| info!(%data_id, "Updated staff record")),
        };

        match result {
            Ok(()) => {
                let message = match kind {
                    ActionKind::Create => CREATED_MESSAGE,
                    ActionKind::Update | ActionKind::Delete => UPDATED_MESSAGE,
                };
                self.complete(message).await;
                self.state().dialog.close();
                ActionOutcome::Succeeded
            }
            Err(err) => self.fail(kind, err),
        }
    }

    /// Delete the record with the given store id.
    pub async fn delete(&self, data_id: &str) -> ActionOutcome {
        let Some(_guard) = self.begin(ActionKind::Delete) else {
            return self.reject_busy();
        };

        match self.store.delete(data_id).await {
            Ok(()) => {
                info!(%data_id, "Deleted staff record");
                self.complete(DELETED_MESSAGE).await;
                ActionOutcome::Succeeded
            }
            Err(err) => self.fail(ActionKind::Delete, err),
        }
    }

    /// Export the visible rows into `dir` and return the written file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written; the failure is also
    /// shown as a notification.
    pub fn export(&self, format: ExportFormat, dir: &Path) -> Result<PathBuf> {
        let rows: Vec<ExportRow> = self.visible_rows().iter().map(ExportRow::from).collect();
        let written = match format {
            ExportFormat::Csv => export::write_csv(dir, &rows, self.csv_style),
            ExportFormat::Pdf => export::write_pdf(dir, &rows),
        };

        let mut state = self.state();
        match &written {
            Ok(path) => state
                .notifications
                .success(format!("Exported {} rows to {}", rows.len(), path.display())),
            Err(err) => {
                warn!("Failed to export {format}: {err}");
                state.notifications.error(format!("Export failed: {err}"));
            }
        }
        written
    }

    /// Replace the rows with a fresh listing and return the row count.
    async fn reload(&self) -> Result<usize> {
        let records = self.store.list_all().await?;
        let count = records.len();
        self.state().rows = Arc::from(records);
        Ok(count)
    }

    /// Reload after a successful mutation and report it.
    async fn complete(&self, message: &str) {
        let reloaded = self.reload().await;
        let mut state = self.state();
        match reloaded {
            Ok(_) => state.notifications.success(message),
            Err(err) => {
                warn!("Change saved but reloading the staff list failed: {err}");
                state
                    .notifications
                    .error(format!("Failed to refresh staff list: {err}"));
            }
        }
    }

    fn fail(&self, kind: ActionKind, err: Error) -> ActionOutcome {
        warn!(%kind, "Staff action failed: {err}");
        self.state()
            .notifications
            .error(format!("Failed to {kind} staff: {err}"));
        ActionOutcome::Failed(err)
    }

    fn reject_busy(&self) -> ActionOutcome {
        debug!("Rejected action while another is in flight");
        self.state()
            .notifications
            .warning("Another change is still being saved");
        ActionOutcome::Busy
    }

    fn warn_duplicate_id(&self, data_id: Option<&str>, id: &str) {
        let duplicate = self
            .state()
            .rows
            .iter()
            .any(|record| record.id == id && Some(record.data_id.as_str()) != data_id);
        if duplicate {
            warn!(%id, "Saving a staff id that is already in use");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Severity;
    use crate::record::{Gender, StaffInput};
    use crate::store::{Document, InMemoryBackend, StoredDocument};
    use crate::validate::Field;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    fn app() -> StaffApp<InMemoryBackend> {
        StaffApp::new(RecordStore::new(InMemoryBackend::new()))
    }

    fn input(id: &str, full_name: &str, gender: Gender) -> StaffInput {
        StaffInput {
            id: id.to_string(),
            full_name: full_name.to_string(),
            birthday: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            gender,
        }
    }

    fn create_event(id: &str, full_name: &str, gender: Gender) -> SaveEvent {
        SaveEvent {
            data_id: None,
            input: input(id, full_name, gender),
        }
    }

    fn last_message(app: &StaffApp<impl DocumentBackend>) -> (Severity, String) {
        let n = app.snapshot().notification.unwrap();
        (n.severity, n.message)
    }

    #[tokio::test]
    async fn test_load_empty() {
        let app = app();
        assert!(app.load().await.is_success());
        assert!(app.snapshot().rows.is_empty());
        assert_eq!(app.snapshot().phase, ActionPhase::Idle);
    }

    #[tokio::test]
    async fn test_create_update_delete_cycle() {
        let app = app();
        app.load().await.into_result().unwrap();

        // Create through the dialog.
        app.open_add_dialog();
        app.update_dialog(|d| {
            d.set_id("S1");
            d.set_full_name("Ann Lee");
            d.set_birthday("1990-01-01");
            d.set_gender_id(2);
        });
        assert!(app.submit_dialog().await.is_success());

        let snap = app.snapshot();
        assert_eq!(snap.rows.len(), 1);
        assert_eq!(snap.rows[0].gender_label(), "Female");
        assert!(!snap.dialog.is_open());
        assert_eq!(
            last_message(&app),
            (Severity::Success, CREATED_MESSAGE.to_string())
        );
        let data_id = snap.rows[0].data_id.clone();

        // Update the name.
        app.open_edit_dialog(&data_id).unwrap();
        assert_eq!(app.snapshot().dialog.title(), "Update Staff");
        app.update_dialog(|d| d.set_full_name("Ann Lee-Smith"));
        assert!(app.submit_dialog().await.is_success());

        let snap = app.snapshot();
        assert_eq!(snap.rows.len(), 1);
        assert_eq!(snap.rows[0].data_id, data_id);
        assert_eq!(snap.rows[0].full_name, "Ann Lee-Smith");
        assert_eq!(
            last_message(&app),
            (Severity::Success, UPDATED_MESSAGE.to_string())
        );

        // Delete it.
        assert!(app.delete(&data_id).await.is_success());
        assert!(app.snapshot().rows.is_empty());
        assert_eq!(
            last_message(&app),
            (Severity::Success, DELETED_MESSAGE.to_string())
        );
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let app = app();
        app.save(create_event("S1", "Ann Lee", Gender::Female))
            .await
            .into_result()
            .unwrap();
        let data_id = app.snapshot().rows[0].data_id.clone();

        app.delete(&data_id).await.into_result().unwrap();
        let outcome = app.delete(&data_id).await;

        assert!(outcome.error().unwrap().is_not_found());
        assert!(app.snapshot().rows.is_empty());
        assert_eq!(last_message(&app).0, Severity::Error);
        assert_eq!(app.snapshot().phase, ActionPhase::Idle);
    }

    #[tokio::test]
    async fn test_save_failure_keeps_dialog_and_rows() {
        let app = app();
        app.save(create_event("S1", "Ann Lee", Gender::Female))
            .await
            .into_result()
            .unwrap();
        let before = app.snapshot().rows;

        app.open_add_dialog();
        app.update_dialog(|d| {
            d.set_id("S2");
            d.set_full_name("Bo Tan");
            d.set_birthday("1985-05-05");
        });
        app.store().backend().set_unavailable(true);

        let outcome = app.submit_dialog().await;
        assert!(outcome.error().unwrap().is_unavailable());

        let snap = app.snapshot();
        assert!(snap.dialog.is_open());
        assert_eq!(snap.dialog.form().id, "S2");
        assert_eq!(snap.rows, before);
        assert_eq!(last_message(&app).0, Severity::Error);
        assert!(last_message(&app).1.starts_with("Failed to create staff"));
    }

    #[tokio::test]
    async fn test_invalid_dialog_does_not_call_store() {
        let app = app();
        app.open_add_dialog();
        app.update_dialog(|d| d.set_id("TOO-LONG-ID"));

        let outcome = app.submit_dialog().await;
        assert!(outcome.error().unwrap().is_validation());
        assert_eq!(app.store().backend().list_calls(), 0);

        let snap = app.snapshot();
        assert!(snap.dialog.is_open());
        assert_eq!(
            snap.dialog.visible_error(Field::Id),
            Some("Must be 8 characters or less")
        );
        assert!(snap.notification.is_none());
    }

    #[tokio::test]
    async fn test_save_validates_input() {
        let app = app();
        let event = SaveEvent {
            data_id: None,
            input: input("WAY-TOO-LONG-ID", "", Gender::Female),
        };

        let outcome = app.save(event).await;
        let Some(Error::Validation(errors)) = outcome.error() else {
            panic!("expected a validation failure, got {outcome:?}");
        };
        assert_eq!(errors.get(Field::Id), Some("Must be 8 characters or less"));
        assert_eq!(errors.get(Field::FullName), Some("Required"));

        assert_eq!(app.store().backend().list_calls(), 0);
        assert!(app.store().list_all().await.unwrap().is_empty());
        assert!(app.snapshot().rows.is_empty());
        assert_eq!(app.snapshot().phase, ActionPhase::Idle);
    }

    #[tokio::test]
    async fn test_save_trims_input() {
        let app = app();
        app.save(create_event("  S1 ", " Ann Lee  ", Gender::Female))
            .await
            .into_result()
            .unwrap();

        let rows = app.snapshot().rows;
        assert_eq!(rows[0].id, "S1");
        assert_eq!(rows[0].full_name, "Ann Lee");
    }

    #[tokio::test]
    async fn test_cancelled_save_returns_to_idle() {
        let app = StaffApp::new(RecordStore::new(
            InMemoryBackend::new().with_latency(Duration::from_millis(50)),
        ));

        let cancelled = tokio::time::timeout(
            Duration::from_millis(5),
            app.save(create_event("S1", "Ann Lee", Gender::Female)),
        )
        .await;
        assert!(cancelled.is_err());
        assert_eq!(app.snapshot().phase, ActionPhase::Idle);

        assert!(app
            .save(create_event("S1", "Ann Lee", Gender::Female))
            .await
            .is_success());
        assert_eq!(app.snapshot().rows.len(), 1);
    }

    #[tokio::test]
    async fn test_load_failure_keeps_rows() {
        let app = app();
        app.save(create_event("S1", "Ann Lee", Gender::Female))
            .await
            .into_result()
            .unwrap();

        app.store().backend().set_unavailable(true);
        let outcome = app.load().await;

        assert!(outcome.error().unwrap().is_unavailable());
        assert_eq!(app.snapshot().rows.len(), 1);
        assert_eq!(last_message(&app).0, Severity::Error);
    }

    #[tokio::test]
    async fn test_concurrent_save_is_rejected() {
        let app = StaffApp::new(RecordStore::new(
            InMemoryBackend::new().with_latency(Duration::from_millis(20)),
        ));

        let (first, second) = tokio::join!(
            app.save(create_event("S1", "Ann Lee", Gender::Female)),
            app.save(create_event("S1", "Ann Lee", Gender::Female)),
        );

        assert!(first.is_success());
        assert!(matches!(second, ActionOutcome::Busy));
        assert_eq!(app.snapshot().rows.len(), 1);

        // The flag is released once the first action completes.
        assert!(app.delete(&app.snapshot().rows[0].data_id).await.is_success());
    }

    #[tokio::test]
    async fn test_open_edit_dialog_unknown_id() {
        let app = app();
        assert!(app.open_edit_dialog("missing").unwrap_err().is_not_found());
        assert!(!app.snapshot().dialog.is_open());
    }

    #[tokio::test]
    async fn test_close_dialog_discards() {
        let app = app();
        app.open_add_dialog();
        app.update_dialog(|d| d.set_full_name("draft"));
        app.close_dialog();

        let snap = app.snapshot();
        assert!(!snap.dialog.is_open());
        assert_eq!(snap.dialog.form().full_name, "");
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_accepted() {
        let app = app();
        app.save(create_event("S1", "Ann Lee", Gender::Female))
            .await
            .into_result()
            .unwrap();
        app.save(create_event("S1", "Ann Twin", Gender::Female))
            .await
            .into_result()
            .unwrap();
        assert_eq!(app.snapshot().rows.len(), 2);
    }

    #[tokio::test]
    async fn test_quick_filter() {
        let app = app();
        for (id, name, gender) in [
            ("S1", "Ann Lee", Gender::Female),
            ("S2", "Bo Tan", Gender::Male),
            ("S3", "Annabel Ng", Gender::Male),
        ] {
            app.save(create_event(id, name, gender))
                .await
                .into_result()
                .unwrap();
        }

        app.set_filter("ANN");
        assert_eq!(app.visible_rows().len(), 2);

        app.set_filter("ann female");
        let visible = app.visible_rows();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "S1");

        app.set_filter("  ");
        assert_eq!(app.snapshot().visible_rows().len(), 3);
    }

    #[test]
    fn test_matches_filter_columns() {
        let record = StaffRecord::from_input("doc1", input("S1", "Ann Lee", Gender::Female));
        assert!(matches_filter(&record, ""));
        assert!(matches_filter(&record, "s1"));
        assert!(matches_filter(&record, "1990-01"));
        assert!(matches_filter(&record, "lee fem"));
        assert!(!matches_filter(&record, "doc1"));
        assert!(!matches_filter(&record, "ann bo"));
    }

    #[tokio::test]
    async fn test_export_uses_visible_rows() {
        let app = app().with_csv_style(CsvStyle::Quoted);
        app.save(create_event("S1", "Ann Lee", Gender::Female))
            .await
            .into_result()
            .unwrap();
        app.save(create_event("S2", "Bo,Tan", Gender::Male))
            .await
            .into_result()
            .unwrap();
        app.set_filter("bo");

        let dir = tempfile::tempdir().unwrap();
        let path = app.export(ExportFormat::Csv, dir.path()).unwrap();
        let csv = std::fs::read_to_string(path).unwrap();
        assert_eq!(
            csv,
            "id,fullName,birthday,gender\nS2,\"Bo,Tan\",1990-01-01,Male"
        );
        assert_eq!(last_message(&app).0, Severity::Success);

        let pdf = app.export(ExportFormat::Pdf, dir.path()).unwrap();
        assert!(pdf.ends_with(export::PDF_FILE_NAME));
    }

    #[tokio::test]
    async fn test_auto_hide_is_configurable() {
        let app = app().with_auto_hide(Duration::from_millis(0));
        app.save(create_event("S1", "Ann Lee", Gender::Female))
            .await
            .into_result()
            .unwrap();
        assert!(app.snapshot().notification.is_none());
    }

    /// Delegates to an in-memory backend but can fail listings alone.
    #[derive(Debug, Default)]
    struct ListFails {
        inner: InMemoryBackend,
        fail_list: AtomicBool,
    }

    #[async_trait]
    impl DocumentBackend for ListFails {
        fn name(&self) -> &'static str {
            "list-fails"
        }

        async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>> {
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(Error::unavailable("list", "listing disabled"));
            }
            self.inner.list(collection).await
        }

        async fn insert(&self, collection: &str, body: Document) -> Result<String> {
            self.inner.insert(collection, body).await
        }

        async fn merge(&self, collection: &str, key: &str, fields: Document) -> Result<()> {
            self.inner.merge(collection, key, fields).await
        }

        async fn remove(&self, collection: &str, key: &str) -> Result<()> {
            self.inner.remove(collection, key).await
        }
    }

    #[tokio::test]
    async fn test_reload_failure_after_save_still_succeeds() {
        let app = StaffApp::new(RecordStore::new(ListFails::default()));
        app.open_add_dialog();
        app.update_dialog(|d| {
            d.set_id("S1");
            d.set_full_name("Ann Lee");
            d.set_birthday("1990-01-01");
        });
        app.store().backend().fail_list.store(true, Ordering::SeqCst);

        assert!(app.submit_dialog().await.is_success());

        let snap = app.snapshot();
        assert!(!snap.dialog.is_open());
        assert!(snap.rows.is_empty());
        assert_eq!(snap.phase, ActionPhase::Idle);
        let (severity, message) = last_message(&app);
        assert_eq!(severity, Severity::Error);
        assert!(message.starts_with("Failed to refresh staff list"));

        app.store().backend().fail_list.store(false, Ordering::SeqCst);
        app.load().await.into_result().unwrap();
        assert_eq!(app.snapshot().rows.len(), 1);
    }
}
