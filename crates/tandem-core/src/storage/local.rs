//! Snapshot persistence for lists and profile
//!
//! Each save replaces the full snapshot on disk. Writes go to a temporary
//! file first, then rename into place, so a snapshot is never left
//! partially written.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::config::Config;
use crate::models::{TodoList, UserProfile};

use super::{StorageError, StorageResult};

/// Persistence handler for the local record store
pub struct LocalStore {
    config: Config,
}

impl LocalStore {
    /// Create a new store over the configured data directory
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ==================== Lists ====================

    /// Save the full list collection
    pub fn save_lists(&self, lists: &[TodoList]) -> StorageResult<()> {
        let path = self.config.lists_path();
        let bytes = serde_json::to_vec_pretty(lists).map_err(|source| {
            StorageError::InvalidSnapshot {
                path: path.clone(),
                source,
            }
        })?;
        atomic_write(&path, &bytes)
    }

    /// Load the full list collection
    ///
    /// A missing snapshot yields an empty collection.
    pub fn load_lists(&self) -> StorageResult<Vec<TodoList>> {
        let path = self.config.lists_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let bytes =
            fs::read(&path).map_err(|e| StorageError::from_read_io(e, path.clone()))?;
        serde_json::from_slice(&bytes)
            .map_err(|source| StorageError::InvalidSnapshot { path, source })
    }

    // ==================== Profile ====================

    /// Save the user profile
    pub fn save_profile(&self, profile: &UserProfile) -> StorageResult<()> {
        let path = self.config.profile_path();
        let bytes = serde_json::to_vec_pretty(profile).map_err(|source| {
            StorageError::InvalidSnapshot {
                path: path.clone(),
                source,
            }
        })?;
        atomic_write(&path, &bytes)
    }

    /// Load the user profile, if one has been created
    pub fn load_profile(&self) -> StorageResult<Option<UserProfile>> {
        let path = self.config.profile_path();
        if !path.exists() {
            return Ok(None);
        }

        let bytes =
            fs::read(&path).map_err(|e| StorageError::from_read_io(e, path.clone()))?;
        let profile = serde_json::from_slice(&bytes)
            .map_err(|source| StorageError::InvalidSnapshot { path, source })?;
        Ok(Some(profile))
    }

    /// Delete the user profile snapshot (logout)
    pub fn delete_profile(&self) -> StorageResult<()> {
        let path = self.config.profile_path();
        if path.exists() {
            fs::remove_file(&path).map_err(|e| StorageError::from_write_io(e, path))?;
        }
        Ok(())
    }

    /// Delete all stored data. Use with caution!
    pub fn clear_all(&self) -> StorageResult<()> {
        for path in [self.config.lists_path(), self.config.profile_path()] {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| StorageError::from_write_io(e, path))?;
            }
        }
        Ok(())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // Create temp file in the same directory (for atomic rename)
    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)
        .map_err(|e| StorageError::from_write_io(e, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|e| StorageError::from_write_io(e, temp_path.clone()))?;

    // Sync to disk before rename
    file.sync_all()
        .map_err(|e| StorageError::from_write_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::Rename {
        from: temp_path,
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
