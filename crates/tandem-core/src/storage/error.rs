//! Storage error handling
//!
//! Typed errors for local snapshot operations with descriptive messages.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during local storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to create data directory
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read snapshot
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write snapshot
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Snapshot exists but cannot be parsed
    #[error("Invalid snapshot in '{path}': {source}")]
    InvalidSnapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Atomic write failed during rename
    #[error("Atomic write failed: could not rename '{from}' to '{to}': {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Classify an I/O error from a read with path context
    pub fn from_read_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            _ => StorageError::Read {
                path,
                source: error,
            },
        }
    }

    /// Classify an I/O error from a write with path context
    pub fn from_write_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            _ => StorageError::Write {
                path,
                source: error,
            },
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
