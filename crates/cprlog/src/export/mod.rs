//! Export of the event log.
//!
//! Three formats: CSV for spreadsheets, JSON for the full `{meta, session}`
//! record, and a standalone HTML summary for printing.

pub mod csv;
pub mod json;
pub mod print;

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

use crate::error::{Error, Result};

/// Column headers shared by the CSV export and the printed table.
pub const COLUMNS: [&str; 5] = ["Clock", "T+ (mm:ss)", "Type", "Label", "Details"];

/// An export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Comma-separated values.
    Csv,
    /// The full record as JSON.
    Json,
    /// A printable HTML summary.
    Print,
}

impl ExportFormat {
    /// File extension, without the dot.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Print => "html",
        }
    }

    /// MIME type of the exported content.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
            Self::Print => "text/html",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
            Self::Print => write!(f, "print"),
        }
    }
}

/// File name for an export made at `now`: `cpr_<ISO-8601>.<ext>` with
/// colons replaced by hyphens.
#[must_use]
pub fn file_name(format: ExportFormat, now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace(':', "-");
    format!("cpr_{stamp}.{}", format.extension())
}

/// Write `contents` into `dir` under the name [`file_name`] gives.
///
/// Creates `dir` if needed and returns the path written.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot
/// be written.
pub fn write(
    dir: &Path,
    format: ExportFormat,
    contents: &str,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let path = dir.join(file_name(format, now));
    std::fs::write(&path, contents).map_err(|source| Error::ExportWrite {
        path: path.clone(),
        source,
    })?;
    info!(format = %format, path = %path.display(), "export written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap()
            + chrono::Duration::milliseconds(123)
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            file_name(ExportFormat::Csv, at()),
            "cpr_2024-05-01T10-20-30.123Z.csv"
        );
        assert_eq!(
            file_name(ExportFormat::Json, at()),
            "cpr_2024-05-01T10-20-30.123Z.json"
        );
        assert!(!file_name(ExportFormat::Print, at()).contains(':'));
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(ExportFormat::Csv.mime_type(), "text/csv");
        assert_eq!(ExportFormat::Json.mime_type(), "application/json");
        assert_eq!(ExportFormat::Print.mime_type(), "text/html");
    }

    #[test]
    fn test_write_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("exports");
        let path = write(&out, ExportFormat::Csv, "a,b\n", at()).unwrap();
        assert_eq!(path, out.join("cpr_2024-05-01T10-20-30.123Z.csv"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "a,b\n");
    }

    #[test]
    fn test_write_into_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();
        assert!(write(&blocker, ExportFormat::Json, "{}", at()).is_err());
    }
}
