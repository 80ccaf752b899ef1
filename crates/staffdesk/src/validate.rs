//! Field validation for the staff edit form.
//!
//! [`validate`] checks a whole [`StaffForm`] and either yields the trimmed,
//! typed [`StaffInput`] or a map of per-field messages. [`validate_field`]
//! runs a single rule and backs incremental validation when a field loses
//! focus.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::record::{Gender, StaffInput, DATE_FORMAT};

/// Maximum length of the user-facing id, in characters.
pub const MAX_ID_LEN: usize = 8;

/// Maximum length of the full name, in characters.
pub const MAX_FULL_NAME_LEN: usize = 100;

const REQUIRED: &str = "Required";

/// A field of the edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Staff id.
    Id,
    /// Full name.
    FullName,
    /// Birthday.
    Birthday,
    /// Gender code.
    Gender,
}

impl Field {
    /// Every form field, in display order.
    pub const ALL: [Field; 4] = [Field::Id, Field::FullName, Field::Birthday, Field::Gender];

    /// The field's name as used in messages and documents.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::FullName => "fullName",
            Self::Birthday => "birthday",
            Self::Gender => "genderId",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw, unvalidated form values as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffForm {
    /// Staff id text.
    pub id: String,
    /// Full name text.
    pub full_name: String,
    /// Birthday text, expected as `YYYY-MM-DD`.
    pub birthday: String,
    /// Gender code as selected.
    pub gender_id: i64,
}

impl Default for StaffForm {
    fn default() -> Self {
        Self {
            id: String::new(),
            full_name: String::new(),
            birthday: String::new(),
            gender_id: Gender::Male.code(),
        }
    }
}

impl From<&StaffInput> for StaffForm {
    fn from(input: &StaffInput) -> Self {
        Self {
            id: input.id.clone(),
            full_name: input.full_name.clone(),
            birthday: input.birthday.format(DATE_FORMAT).to_string(),
            gender_id: input.gender.code(),
        }
    }
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<Field, String>,
}

impl ValidationErrors {
    /// Record a message for a field, replacing any earlier one.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.fields.insert(field, message.into());
    }

    /// The message for a field, if it failed.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Check whether a field failed.
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    /// Check whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over failing fields and their messages.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.fields.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

/// Validate a complete form.
///
/// # Errors
///
/// Returns every failing field with its message when any rule fails.
pub fn validate(form: &StaffForm) -> Result<StaffInput, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    for field in Field::ALL {
        if let Err(message) = check(form, field) {
            errors.insert(field, message);
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    // All rules passed, so the conversions below cannot fail.
    let birthday = parse_birthday(&form.birthday).map_err(|message| {
        let mut errors = ValidationErrors::default();
        errors.insert(Field::Birthday, message);
        errors
    })?;
    let gender = Gender::from_code(form.gender_id).unwrap_or_default();

    Ok(StaffInput {
        id: form.id.trim().to_string(),
        full_name: form.full_name.trim().to_string(),
        birthday,
        gender,
    })
}

/// Validate a single field, returning its message if it fails.
#[must_use]
pub fn validate_field(form: &StaffForm, field: Field) -> Option<String> {
    check(form, field).err().map(str::to_string)
}

fn check(form: &StaffForm, field: Field) -> Result<(), &'static str> {
    match field {
        Field::Id => check_text(&form.id, MAX_ID_LEN, "Must be 8 characters or less"),
        Field::FullName => check_text(
            &form.full_name,
            MAX_FULL_NAME_LEN,
            "Must be 100 characters or less",
        ),
        Field::Birthday => parse_birthday(&form.birthday).map(|_| ()),
        Field::Gender => Gender::from_code(form.gender_id)
            .map(|_| ())
            .ok_or("Invalid gender"),
    }
}

fn check_text(value: &str, max: usize, too_long: &'static str) -> Result<(), &'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(REQUIRED);
    }
    if trimmed.chars().count() > max {
        return Err(too_long);
    }
    Ok(())
}

fn parse_birthday(value: &str) -> Result<NaiveDate, &'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(REQUIRED);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| "Invalid date")
}
