//! Command-line interface for cprlog.
//!
//! This module provides the CLI structure for the `cprlog` binary and the
//! text renderers its commands print with.

mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, ExportCommand, ExportFormatArg, LogCommand, OutputFormat, PatientCommand,
    ShockCommand, StatusCommand,
};

use crate::action::Action;

/// cprlog - Record a resuscitation as it happens
///
/// Keeps the arrest clock, compression time and drug and shock timers, and
/// logs every intervention with its offset from the arrest. State persists
/// between invocations; `run` opens an interactive session with live timers.
#[derive(Debug, Parser)]
#[command(name = "cprlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
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
    /// Start or resume the session (restarts the arrest clock)
    Start,

    /// Pause the session
    Pause,

    /// Clear the session; patient details are kept
    Reset {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Start or stop chest compressions
    Compressions,

    /// Log a rhythm (VF/VT, PEA, Asystole, ROSC, Unknown or free text)
    Rhythm {
        /// Rhythm name
        name: String,
    },

    /// Log a defibrillation shock
    Shock(ShockCommand),

    /// Log epinephrine 1 mg IV/IO and restart the epi timer
    Epi,

    /// Log a drug from the catalog (see `drugs`)
    Drug {
        /// Drug code, e.g. AMIO
        code: String,
    },

    /// Log an airway step
    Airway {
        /// What was done, e.g. BVM
        label: String,
    },

    /// Log endotracheal tube placement
    Intubation,

    /// Log a pulse check
    PulseCheck,

    /// Log a rhythm check
    RhythmCheck,

    /// Log return of spontaneous circulation
    Rosc,

    /// Log a free-text note
    Note {
        /// Note text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Set patient and context details
    Patient(PatientCommand),

    /// Show timers and counts
    Status(StatusCommand),

    /// Show the event log
    Log(LogCommand),

    /// Write the log to a file
    Export(ExportCommand),

    /// List the drug catalog
    Drugs,

    /// Interactive session with live timers
    Run,

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Command {
    /// The ledger action this command performs, if it is one.
    ///
    /// `reset` is left to the caller, which handles confirmation.
    #[must_use]
    pub fn into_action(self) -> Option<Action> {
        let action = match self {
            Self::Start => Action::Start,
            Self::Pause => Action::Pause,
            Self::Compressions => Action::ToggleCompressions,
            Self::Rhythm { name } => Action::Rhythm(name),
            Self::Shock(cmd) => Action::Shock(cmd.energy),
            Self::Epi => Action::Epinephrine,
            Self::Drug { code } => Action::Drug(code),
            Self::Airway { label } => Action::Airway(label),
            Self::Intubation => Action::Intubation,
            Self::PulseCheck => Action::PulseCheck,
            Self::RhythmCheck => Action::RhythmCheck,
            Self::Rosc => Action::Rosc,
            Self::Note { text } => Action::Note(text.join(" ")),
            Self::Patient(cmd) => cmd.into(),
            Self::Reset { .. }
            | Self::Status(_)
            | Self::Log(_)
            | Self::Export(_)
            | Self::Drugs
            | Self::Run
            | Self::Config(_) => return None,
        };
        Some(action)
    }
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}
