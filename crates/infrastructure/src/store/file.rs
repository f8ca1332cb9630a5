//! File-backed token store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bankline_application::ports::{StoreError, TokenStore};
use bankline_domain::StorageKey;
use parking_lot::RwLock;
use tracing::debug;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

/// Token store persisted as a small JSON object on disk.
///
/// The file is read once on open. Every batch is written to a sibling temp
/// file and renamed over the original, and the in-memory copy only changes
/// once the rename succeeded.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileTokenStore {
    /// Opens the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let entries = match fs::read(&path) {
            Ok(bytes) => from_json_bytes(&bytes)
                .map_err(|e| StoreError::Serialization(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StoreError::Io(e)),
        };

        debug!(path = %path.display(), keys = entries.len(), "opened token store");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let bytes =
            to_json_stable_bytes(entries).map_err(|e| StoreError::Serialization(e.to_string()))?;

        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        fs::write(&temp, bytes)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self.entries.write();
        let mut next = entries.clone();
        apply(&mut next);

        if next != *entries {
            self.persist(&next)?;
            *entries = next;
        }
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: StorageKey) -> Option<String> {
        self.entries.read().get(key.as_str()).cloned()
    }

    fn get_many(&self, keys: &[StorageKey]) -> Vec<Option<String>> {
        let entries = self.entries.read();
        keys.iter()
            .map(|key| entries.get(key.as_str()).cloned())
            .collect()
    }

    fn write_all(&self, batch: &[(StorageKey, String)]) -> Result<(), StoreError> {
        self.update(|entries| {
            for (key, value) in batch {
                entries.insert(key.as_str().to_string(), value.clone());
            }
        })
    }

    fn remove_all(&self, keys: &[StorageKey]) -> Result<(), StoreError> {
        self.update(|entries| {
            for key in keys {
                entries.remove(key.as_str());
            }
        })
    }
}
