//! Core staff record types for staffdesk.
//!
//! A [`StaffRecord`] is a persisted row as shown in the listing. A
//! [`StaffInput`] is the validated payload of the edit form, before the
//! store has assigned a `data_id`. A [`StaffPatch`] carries the fields an
//! update overwrites.

use chrono::NaiveDate;
use serde::Serialize;

/// Textual date format used for birthdays in forms, documents and exports.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Gender of a staff member, stored as an integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gender {
    /// Code 1.
    #[default]
    Male,
    /// Code 2.
    Female,
}

impl Gender {
    /// The integer code stored in documents.
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::Male => 1,
            Self::Female => 2,
        }
    }

    /// Map an integer code back to a gender, if it is one of the known codes.
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Male),
            2 => Some(Self::Female),
            _ => None,
        }
    }

    /// The display label shown in the listing and exports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A persisted staff record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffRecord {
    /// Identifier assigned by the document store.
    pub data_id: String,
    /// Short user-facing identifier (at most 8 characters).
    pub id: String,
    /// Full name (at most 100 characters).
    pub full_name: String,
    /// Date of birth.
    pub birthday: NaiveDate,
    /// Gender code.
    pub gender: Gender,
}

impl StaffRecord {
    /// Build a record from validated input and the id the store assigned to it.
    #[must_use]
    pub fn from_input(data_id: impl Into<String>, input: StaffInput) -> Self {
        Self {
            data_id: data_id.into(),
            id: input.id,
            full_name: input.full_name,
            birthday: input.birthday,
            gender: input.gender,
        }
    }

    /// The `gender` display string derived from the gender code.
    #[must_use]
    pub fn gender_label(&self) -> &'static str {
        self.gender.label()
    }

    /// The birthday formatted as `YYYY-MM-DD`.
    #[must_use]
    pub fn birthday_text(&self) -> String {
        self.birthday.format(DATE_FORMAT).to_string()
    }

    /// The user-editable part of this record.
    #[must_use]
    pub fn to_input(&self) -> StaffInput {
        StaffInput {
            id: self.id.clone(),
            full_name: self.full_name.clone(),
            birthday: self.birthday,
            gender: self.gender,
        }
    }

    /// The serializable listing row for this record.
    #[must_use]
    pub fn to_row(&self) -> ListingRow {
        ListingRow {
            data_id: self.data_id.clone(),
            id: self.id.clone(),
            full_name: self.full_name.clone(),
            birthday: self.birthday_text(),
            gender_id: self.gender.code(),
            gender: self.gender_label(),
        }
    }
}

/// Validated form payload for a create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffInput {
    /// Short user-facing identifier.
    pub id: String,
    /// Full name.
    pub full_name: String,
    /// Date of birth.
    pub birthday: NaiveDate,
    /// Gender code.
    pub gender: Gender,
}

/// Fields overwritten by an update. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffPatch {
    /// New user-facing identifier.
    pub id: Option<String>,
    /// New full name.
    pub full_name: Option<String>,
    /// New date of birth.
    pub birthday: Option<NaiveDate>,
    /// New gender.
    pub gender: Option<Gender>,
}

impl From<StaffInput> for StaffPatch {
    fn from(input: StaffInput) -> Self {
        Self {
            id: Some(input.id),
            full_name: Some(input.full_name),
            birthday: Some(input.birthday),
            gender: Some(input.gender),
        }
    }
}

/// A listing row as emitted to front-ends (`--format json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRow {
    /// Store-assigned identifier.
    pub data_id: String,
    /// User-facing identifier.
    pub id: String,
    /// Full name.
    pub full_name: String,
    /// Birthday as `YYYY-MM-DD`.
    pub birthday: String,
    /// Gender code.
    pub gender_id: i64,
    /// Gender display label.
    pub gender: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> StaffInput {
        StaffInput {
            id: "S1".to_string(),
            full_name: "Ann Lee".to_string(),
            birthday: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            gender: Gender::Male,
        }
    }

    #[test]
    fn test_gender_codes() {
        assert_eq!(Gender::Male.code(), 1);
        assert_eq!(Gender::Female.code(), 2);
        assert_eq!(Gender::from_code(1), Some(Gender::Male));
        assert_eq!(Gender::from_code(2), Some(Gender::Female));
        assert_eq!(Gender::from_code(0), None);
        assert_eq!(Gender::from_code(3), None);
    }

    #[test]
    fn test_gender_labels() {
        assert_eq!(Gender::Male.label(), "Male");
        assert_eq!(Gender::Female.to_string(), "Female");
        assert_eq!(Gender::default(), Gender::Male);
    }

    #[test]
    fn test_record_from_input() {
        let record = StaffRecord::from_input("doc1", sample_input());
        assert_eq!(record.data_id, "doc1");
        assert_eq!(record.gender_label(), "Male");
        assert_eq!(record.birthday_text(), "1990-01-01");
        assert_eq!(record.to_input(), sample_input());
    }

    #[test]
    fn test_listing_row_serialization() {
        let record = StaffRecord::from_input("doc1", sample_input());
        let json = serde_json::to_value(record.to_row()).unwrap();
        assert_eq!(json["dataId"], "doc1");
        assert_eq!(json["fullName"], "Ann Lee");
        assert_eq!(json["birthday"], "1990-01-01");
        assert_eq!(json["genderId"], 1);
        assert_eq!(json["gender"], "Male");
    }

    #[test]
    fn test_patch_from_input_is_full() {
        let patch = StaffPatch::from(sample_input());
        assert_eq!(patch.id.as_deref(), Some("S1"));
        assert_eq!(patch.full_name.as_deref(), Some("Ann Lee"));
        assert_eq!(patch.gender, Some(Gender::Male));
        assert_eq!(StaffPatch::default().birthday, None);
    }
}
