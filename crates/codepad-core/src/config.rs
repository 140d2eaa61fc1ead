//! Store configuration
//!
//! Loaded from `codepad.toml`:
//!
//! ```toml
//! database_path = "/var/lib/codepad/codepad.db"
//!
//! [defaults]
//! theme = "light"
//! fontSize = 16
//! tabSize = 4
//! ```

use crate::project::ProjectSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "CODEPAD_DATA_DIR";
/// Environment variable pointing at a config file
pub const CONFIG_ENV: &str = "CODEPAD_CONFIG";

const CONFIG_FILE: &str = "codepad.toml";
const DATABASE_FILE: &str = "codepad.db";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid defaults in {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

/// Store configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file; defaults to `codepad.db` in the data directory
    pub database_path: Option<PathBuf>,
    /// Settings given to newly created projects
    pub defaults: ProjectSettings,
}

impl StoreConfig {
    /// Load configuration
    ///
    /// Uses `explicit` if given, then `$CODEPAD_CONFIG`, then
    /// `codepad.toml` in the data directory if it exists. Without any of
    /// those the built-in defaults apply.
    ///
    /// # Errors
    /// Returns an error if a config file exists but cannot be read or parsed
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }

        let path = data_dir().join(CONFIG_FILE);
        if path.is_file() {
            Self::from_file(&path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Read and parse a config file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config
            .defaults
            .validate()
            .map_err(|message| ConfigError::Invalid {
                path: path.to_path_buf(),
                message,
            })?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Set the database path
    #[must_use]
    pub fn with_database_path(mut self, path: PathBuf) -> Self {
        self.database_path = Some(path);
        self
    }

    /// Database path, falling back to the data directory
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| data_dir().join(DATABASE_FILE))
    }
}

/// Get the application data directory
///
/// Priority:
/// 1. `$CODEPAD_DATA_DIR`
/// 2. Platform data directory (`~/.local/share/codepad` on Linux)
/// 3. `$HOME/.codepad`
/// 4. A temporary directory
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(dir) = dirs::data_dir() {
        return dir.join("codepad");
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".codepad");
    }

    let temp = std::env::temp_dir().join("codepad-data");
    tracing::warn!(
        path = %temp.display(),
        "could not determine home directory, data will not persist across reboots"
    );
    temp
}
