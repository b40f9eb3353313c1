//! Configuration management for cprlog.
//!
//! Loaded with figment from defaults, an optional TOML file and `CPRLOG_`
//! environment variables.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::catalog::DEFAULT_SHOCK_ENERGY;
use crate::error::{Error, Result};
use crate::patient::DEFAULT_LOCATION;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "cprlog";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "cprlog.db";

/// Application configuration.
///
/// Precedence, highest first:
/// 1. Environment variables (prefixed with `CPRLOG_`, sections split on `__`,
///    e.g. `CPRLOG_RECORDER__DEFAULT_LOCATION=ICU`)
/// 2. TOML config file at `~/.config/cprlog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Recorder defaults.
    pub recorder: RecorderConfig,
    /// Export configuration.
    pub export: ExportConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/cprlog/cprlog.db`
    pub database_path: Option<PathBuf>,
}

/// Defaults applied when recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Energy used by `shock` when none is given.
    pub default_shock_energy_joules: f64,
    /// Location pre-filled for a new patient record.
    pub default_location: String,
}

/// Export-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory export files are written to.
    pub output_dir: PathBuf,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            default_shock_energy_joules: DEFAULT_SHOCK_ENERGY,
            default_location: DEFAULT_LOCATION.to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A missing file is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("CPRLOG_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// Shock energy is deliberately unchecked: any number is accepted when
    /// recording, so the default is too.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.export.output_dir.as_os_str().is_empty() {
            return Err(Error::ConfigValidation {
                message: "export.output_dir must not be empty".to_string(),
            });
        }

        if let Some(path) = &self.storage.database_path {
            if path.as_os_str().is_empty() {
                return Err(Error::ConfigValidation {
                    message: "storage.database_path must not be empty when set".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.storage.database_path.is_none());
        assert!((config.recorder.default_shock_energy_joules - 200.0).abs() < f64::EPSILON);
        assert_eq!(config.recorder.default_location, "ED");
        assert_eq!(config.export.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_output_dir() {
        let mut config = Config::default();
        config.export.output_dir = PathBuf::new();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("output_dir"));
    }

    #[test]
    fn test_validate_empty_database_path() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::new());
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("database_path"));
    }

    #[test]
    fn test_negative_default_energy_is_allowed() {
        let mut config = Config::default();
        config.recorder.default_shock_energy_joules = -1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("cprlog.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/cpr.db"));
        assert_eq!(config.database_path(), PathBuf::from("/custom/path/cpr.db"));
    }

    #[test]
    fn test_default_paths_mention_app() {
        assert!(Config::default_config_path()
            .to_string_lossy()
            .contains("cprlog"));
        assert!(Config::default_data_dir().to_string_lossy().contains("cprlog"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[recorder]\ndefault_shock_energy_joules = 150\ndefault_location = \"ICU\"\n\n[export]\noutput_dir = \"/tmp/cpr\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert!((config.recorder.default_shock_energy_joules - 150.0).abs() < f64::EPSILON);
        assert_eq!(config.recorder.default_location, "ICU");
        assert_eq!(config.export.output_dir, PathBuf::from("/tmp/cpr"));
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[export]\noutput_dir = \"\"\n").unwrap();
        assert!(matches!(
            Config::load_from(Some(path)),
            Err(Error::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_recorder_config_deserialize_partial() {
        let recorder: RecorderConfig = serde_json::from_str(r#"{"default_location":"Ward 4"}"#).unwrap();
        assert_eq!(recorder.default_location, "Ward 4");
        assert!((recorder.default_shock_energy_joules - 200.0).abs() < f64::EPSILON);
    }
}
