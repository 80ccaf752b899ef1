//! Add/edit form state.
//!
//! The dialog keeps nothing between opens: opening it binds the form to a
//! selected record or to blank defaults, closing it resets everything.
//! Errors are tracked for every field but only reported for fields the user
//! has touched (blurred, or all fields once a submit was attempted).

use std::collections::BTreeSet;

use crate::record::{StaffInput, StaffRecord};
use crate::validate::{self, Field, StaffForm, ValidationErrors};

/// Whether the dialog creates a new record or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMode {
    /// Creating a new record.
    Add,
    /// Editing a persisted record.
    Edit,
}

/// A valid submission of the dialog.
///
/// `data_id` is the store id of the record being edited, or `None` when the
/// dialog was opened for a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveEvent {
    /// Store id of the edited record, if any.
    pub data_id: Option<String>,
    /// Validated field values.
    pub input: StaffInput,
}

/// State of the add/edit dialog.
#[derive(Debug, Clone, Default)]
pub struct EditDialog {
    open: bool,
    target: Option<String>,
    form: StaffForm,
    touched: BTreeSet<Field>,
    errors: ValidationErrors,
}

impl EditDialog {
    /// Open the dialog for `target`, or for a new record when `None`.
    pub fn open(&mut self, target: Option<&StaffRecord>) {
        self.reset();
        if let Some(record) = target {
            self.form = StaffForm::from(&record.to_input());
            self.target = Some(record.data_id.clone());
        }
        self.open = true;
    }

    /// Close the dialog, discarding all form state.
    pub fn close(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check whether the dialog is showing.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Add or edit.
    #[must_use]
    pub fn mode(&self) -> DialogMode {
        if self.target.is_some() {
            DialogMode::Edit
        } else {
            DialogMode::Add
        }
    }

    /// Dialog heading.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self.mode() {
            DialogMode::Add => "Add Staff",
            DialogMode::Edit => "Update Staff",
        }
    }

    /// Label of the submit button.
    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        match self.mode() {
            DialogMode::Add => "Save",
            DialogMode::Edit => "Update",
        }
    }

    /// Store id of the record being edited.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Current raw form values.
    #[must_use]
    pub fn form(&self) -> &StaffForm {
        &self.form
    }

    /// Set the staff id text.
    pub fn set_id(&mut self, value: impl Into<String>) {
        self.form.id = value.into();
        self.revalidate(Field::Id);
    }

    /// Set the full name text.
    pub fn set_full_name(&mut self, value: impl Into<String>) {
        self.form.full_name = value.into();
        self.revalidate(Field::FullName);
    }

    /// Set the birthday text (`YYYY-MM-DD`).
    pub fn set_birthday(&mut self, value: impl Into<String>) {
        self.form.birthday = value.into();
        self.revalidate(Field::Birthday);
    }

    /// Set the gender code.
    pub fn set_gender_id(&mut self, code: i64) {
        self.form.gender_id = code;
        self.revalidate(Field::Gender);
    }

    /// Mark a field as touched and validate it.
    pub fn blur(&mut self, field: Field) {
        self.touched.insert(field);
        self.refresh(field);
    }

    /// The error to display for a field, if it is touched and invalid.
    #[must_use]
    pub fn visible_error(&self, field: Field) -> Option<&str> {
        if self.touched.contains(&field) {
            self.errors.get(field)
        } else {
            None
        }
    }

    /// Check whether any field currently fails validation.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Validate the whole form and produce the save event.
    ///
    /// # Errors
    ///
    /// Returns the failing fields; every field is marked touched so all
    /// messages become visible.
    pub fn submit(&mut self) -> Result<SaveEvent, ValidationErrors> {
        self.touched.extend(Field::ALL);
        match validate::validate(&self.form) {
            Ok(input) => {
                self.errors = ValidationErrors::default();
                Ok(SaveEvent {
                    data_id: self.target.clone(),
                    input,
                })
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    fn revalidate(&mut self, field: Field) {
        if self.touched.contains(&field) {
            self.refresh(field);
        }
    }

    fn refresh(&mut self, field: Field) {
        let mut errors = ValidationErrors::default();
        for (f, message) in self.errors.iter().filter(|(f, _)| *f != field) {
            errors.insert(f, message);
        }
        if let Some(message) = validate::validate_field(&self.form, field) {
            errors.insert(field, message);
        }
        self.errors = errors;
    }
}
