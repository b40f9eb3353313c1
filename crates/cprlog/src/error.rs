//! Error types for cprlog.
//!
//! Ledger operations never fail; these errors cover the surfaces around the
//! ledger: the backing store, configuration, exports, and parsing of
//! user-typed commands.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for cprlog operations.
#[derive(Error, Debug)]
pub enum Error {
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

    // === Command Errors ===
    /// A typed command could not be understood.
    #[error("unknown command: '{input}'")]
    UnknownCommand {
        /// The text that failed to parse.
        input: String,
    },

    /// A drug code is not in the catalog.
    #[error("unknown drug code '{code}'")]
    UnknownDrug {
        /// The code that was requested.
        code: String,
    },

    /// A command was missing a required argument.
    #[error("'{command}' needs {expected}")]
    MissingArgument {
        /// The command word.
        command: String,
        /// What the command expected.
        expected: &'static str,
    },

    // === Export Errors ===
    /// Writing an export file failed.
    #[error("failed to write export {path}: {source}")]
    ExportWrite {
        /// Path of the export file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

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
}

/// A specialized Result type for cprlog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an unknown command error.
    #[must_use]
    pub fn unknown_command(input: impl Into<String>) -> Self {
        Self::UnknownCommand {
            input: input.into(),
        }
    }

    /// Create an unknown drug error.
    #[must_use]
    pub fn unknown_drug(code: impl Into<String>) -> Self {
        Self::UnknownDrug { code: code.into() }
    }

    /// Create a missing argument error.
    #[must_use]
    pub fn missing_argument(command: impl Into<String>, expected: &'static str) -> Self {
        Self::MissingArgument {
            command: command.into(),
            expected,
        }
    }

    /// Check if this error came from user input rather than the environment.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownCommand { .. } | Self::UnknownDrug { .. } | Self::MissingArgument { .. }
        )
    }
}
