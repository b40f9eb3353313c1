//! CLI command definitions.
//!
//! This module defines the structure of the CLI subcommands that take
//! arguments, and the conversions from them into library types.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::action::Action;
use crate::export::ExportFormat;
use crate::patient::PatientUpdate;

/// Shock command arguments.
#[derive(Debug, Args)]
pub struct ShockCommand {
    /// Energy in joules (defaults to the configured energy, 200 J)
    #[arg(short, long, value_name = "J", allow_negative_numbers = true)]
    pub energy: Option<f64>,
}

/// Patient metadata arguments. Only the given fields change.
#[derive(Debug, Default, Args)]
pub struct PatientCommand {
    /// Patient identifier (MRN)
    #[arg(long)]
    pub id: Option<String>,

    /// Age
    #[arg(long)]
    pub age: Option<String>,

    /// Sex
    #[arg(long)]
    pub sex: Option<String>,

    /// Weight in kilograms
    #[arg(long)]
    pub weight: Option<String>,

    /// Location
    #[arg(long)]
    pub location: Option<String>,

    /// Person recording
    #[arg(long)]
    pub operator: Option<String>,
}

impl From<PatientCommand> for PatientUpdate {
    fn from(cmd: PatientCommand) -> Self {
        Self {
            patient_id: cmd.id,
            age: cmd.age,
            sex: cmd.sex,
            weight_kg: cmd.weight,
            location: cmd.location,
            operator: cmd.operator,
        }
    }
}

impl From<PatientCommand> for Action {
    fn from(cmd: PatientCommand) -> Self {
        Self::SetPatient(cmd.into())
    }
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Log command arguments.
#[derive(Debug, Args)]
pub struct LogCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// What to export
    #[arg(value_enum)]
    pub format: ExportFormatArg,

    /// Directory to write into (defaults to `export.output_dir`)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
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

/// Export format argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormatArg {
    /// Spreadsheet rows
    Csv,
    /// Full record with patient metadata
    Json,
    /// Printable HTML summary
    Print,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Csv => Self::Csv,
            ExportFormatArg::Json => Self::Json,
            ExportFormatArg::Print => Self::Print,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
