//! Editor configuration.
//!
//! Loaded from TOML; every field is optional and falls back to [`EditorConfig::default`].
//!
//! ```toml
//! undo_limit = 500
//! strip_carriage_returns = true
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings shared by the buffers and views of an editing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo steps kept per view. `None` keeps everything.
    pub undo_limit: Option<usize>,
    /// Drop a `'\r'` that precedes each `'\n'` when reading files.
    pub strip_carriage_returns: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_limit: None,
            strip_carriage_returns: true,
        }
    }
}

impl EditorConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<string>"),
            source,
        })
    }

    /// Load a config file. A missing file is not an error and yields `Ok(None)`.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded editor config from {}", path.display());
        Ok(Some(config))
    }
}
