//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::export::ExportFormat;
use crate::record::Gender;

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Quick filter: whitespace-separated terms that must all match
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Staff id (at most 8 characters)
    #[arg(long)]
    pub id: String,

    /// Full name (at most 100 characters)
    #[arg(short, long)]
    pub name: String,

    /// Date of birth as YYYY-MM-DD
    #[arg(short, long)]
    pub birthday: String,

    /// Gender
    #[arg(short, long, value_enum, default_value = "male")]
    pub gender: GenderArg,
}

/// Edit command arguments.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Store id of the record to edit (see `list`)
    pub data_id: String,

    /// New staff id
    #[arg(long)]
    pub id: Option<String>,

    /// New full name
    #[arg(short, long)]
    pub name: Option<String>,

    /// New date of birth as YYYY-MM-DD
    #[arg(short, long)]
    pub birthday: Option<String>,

    /// New gender
    #[arg(short, long, value_enum)]
    pub gender: Option<GenderArg>,
}

impl EditCommand {
    /// Check whether any field would change.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.id.is_some() || self.name.is_some() || self.birthday.is_some() || self.gender.is_some()
    }
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Store id of the record to delete (see `list`)
    pub data_id: String,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// File format
    #[arg(value_enum)]
    pub format: ExportFormatArg,

    /// Only export rows matching this quick filter
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Directory to write the file into (defaults to `export.directory`)
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Gender argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GenderArg {
    /// Code 1
    Male,
    /// Code 2
    Female,
}

impl From<GenderArg> for Gender {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::Male => Self::Male,
            GenderArg::Female => Self::Female,
        }
    }
}

/// Export format argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormatArg {
    /// staff_data.csv
    Csv,
    /// staff_data.pdf
    Pdf,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Csv => Self::Csv,
            ExportFormatArg::Pdf => Self::Pdf,
        }
    }
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated lines
    Plain,
    /// Aligned table
    #[default]
    Table,
    /// JSON array
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_arg_conversion() {
        assert_eq!(Gender::from(GenderArg::Male), Gender::Male);
        assert_eq!(Gender::from(GenderArg::Female), Gender::Female);
        assert_eq!(Gender::from(GenderArg::Female).code(), 2);
    }

    #[test]
    fn test_export_format_arg_conversion() {
        assert_eq!(ExportFormat::from(ExportFormatArg::Csv), ExportFormat::Csv);
        assert_eq!(ExportFormat::from(ExportFormatArg::Pdf), ExportFormat::Pdf);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }

    #[test]
    fn test_edit_has_changes() {
        let mut cmd = EditCommand {
            data_id: "doc1".to_string(),
            id: None,
            name: None,
            birthday: None,
            gender: None,
        };
        assert!(!cmd.has_changes());
        cmd.gender = Some(GenderArg::Female);
        assert!(cmd.has_changes());
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
