//! Error types.

use crate::buffer::BufferId;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of buffer file and registry operations.
#[derive(Debug, Error)]
pub enum BufferError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file being read or written.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// `save` was called on a buffer that was never associated with a file.
    #[error("buffer has no file path")]
    NoPath,

    /// The registry has no buffer with this id.
    #[error("unknown buffer {0:?}")]
    UnknownBuffer(BufferId),
}

/// Failures loading an [`crate::EditorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file at {path}: {source}")]
    Read {
        /// Path of the config file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`crate::EditorConfig`].
    #[error("failed to parse config file at {path}: {source}")]
    Parse {
        /// Path of the config file, or `<string>` when parsed from memory.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: toml::de::Error,
    },
}
