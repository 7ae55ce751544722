//! Error types for the versioned store.

use std::path::PathBuf;

use thiserror::Error;

use cascade_core::CoreError;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while reading or writing store artifacts.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding or decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Metadata encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A versioned file already exists for this fund, date and second.
    #[error("Version already exists: {path}")]
    VersionExists {
        /// Path of the existing file.
        path: PathBuf,
    },

    /// A stored file could not be interpreted.
    #[error("Corrupt file {path}: {reason}")]
    Corrupt {
        /// Path of the file.
        path: PathBuf,
        /// What was wrong.
        reason: String,
    },

    /// Stored rows do not form a valid weight table.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StoreError {
    /// Creates an I/O error bound to a path.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a corrupt file error.
    #[must_use]
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
