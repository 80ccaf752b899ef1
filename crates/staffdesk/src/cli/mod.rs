//! Command-line interface for staffdesk.
//!
//! This module provides the CLI structure, listing renderers and the
//! glue that turns commands into application actions.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, DeleteCommand, EditCommand, ExportCommand, ExportFormatArg,
    GenderArg, ListCommand, OutputFormat,
};
pub use output::render_rows;

use crate::logging::Verbosity;

/// staffdesk - Manage staff records
///
/// Lists, adds, edits and deletes staff records kept in a local document
/// store, and exports the listing as CSV or PDF.
#[derive(Debug, Parser)]
#[command(name = "staffdesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List staff records
    List(ListCommand),

    /// Add a staff record
    Add(AddCommand),

    /// Edit a staff record
    Edit(EditCommand),

    /// Delete a staff record
    Delete(DeleteCommand),

    /// Export the listing as CSV or PDF
    Export(ExportCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
