//! services/client/src/adapters/storage.rs
//!
//! This module contains the file-backed storage adapter, the concrete
//! implementation of the `StorageBackend` port from the `core` crate.
//! Each storage key maps to one `<key>.json` file under a data
//! directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use local_roots_core::ports::{PortError, PortResult, StorageBackend};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A storage adapter that implements the `StorageBackend` port over
/// plain JSON files.
#[derive(Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    /// Creates the adapter, making sure the data directory exists.
    pub fn new(dir: impl Into<PathBuf>) -> PortResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| PortError::Unavailable(format!("cannot create {}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

//=========================================================================================
// `StorageBackend` Trait Implementation
//=========================================================================================

impl StorageBackend for JsonFileStorage {
    /// Reads the raw JSON for `key`. A missing file is a normal first
    /// run; any other read failure is logged and also degrades to
    /// `None`, per the load-never-fails contract.
    fn load_raw(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Some(raw),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(key, path = %path.display(), error = %e, "storage read failed");
                None
            }
        }
    }

    /// Write-through save. A write failure surfaces as an error since
    /// there is no further fallback tier.
    fn save_raw(&self, key: &str, json: &str) -> PortResult<()> {
        let path = self.path_for(key);
        fs::write(&path, json)
            .map_err(|e| PortError::Unavailable(format!("cannot write {}: {e}", path.display())))
    }
}
