// Configuration loading and parsing (practice.toml).
//
// Everything in the file is optional: a missing file, section, or key falls
// back to platform defaults, so a first run needs no setup at all.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// File name looked up in the working directory, then in the platform
/// config directory.
pub const CONFIG_FILE_NAME: &str = "practice.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// The assembled application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database location. `":memory:"` is accepted for throwaway runs.
    pub db_path: String,
    /// Directory for the log file (the terminal itself belongs to the TUI).
    pub log_dir: PathBuf,
}

/// Raw deserialization target for practice.toml.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    database: DatabaseSection,
    #[serde(default)]
    logging: LoggingSection,
}

#[derive(Debug, Default, Deserialize)]
struct DatabaseSection {
    path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingSection {
    dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "rewrite-practice")
}

/// Default database location: the platform data directory, falling back to
/// the working directory when the platform offers none.
fn default_db_path() -> String {
    match project_dirs() {
        Some(dirs) => dirs.data_dir().join("practice.db").display().to_string(),
        None => "practice.db".to_string(),
    }
}

fn resolve(file: ConfigFile) -> Config {
    Config {
        db_path: file.database.path.unwrap_or_else(default_db_path),
        log_dir: file
            .logging
            .dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("logs")),
    }
}

/// Load and validate configuration from an explicit file path.
///
/// This is the lower-level loading primitive; prefer `load_config()`, which
/// handles file discovery and the no-file default case.
pub(crate) fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    let file: ConfigFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = resolve(file);
    validate(&config)?;
    Ok(config)
}

/// Locate and load the configuration: `practice.toml` in the working
/// directory first, then the platform config directory. When neither
/// exists, every setting takes its default.
pub fn load_config() -> Result<Config, ConfigError> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return load_config_from(&local);
    }

    if let Some(dirs) = project_dirs() {
        let candidate = dirs.config_dir().join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return load_config_from(&candidate);
        }
    }

    let config = resolve(ConfigFile::default());
    validate(&config)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.db_path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    if config.log_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "logging.dir".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
