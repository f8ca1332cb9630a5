//! In-memory token store.

use std::collections::BTreeMap;

use bankline_application::ports::{StoreError, TokenStore};
use bankline_domain::StorageKey;
use parking_lot::RwLock;

/// Thread-safe in-memory token store.
///
/// Batches are applied under one write lock, so readers never see half a
/// credential pair.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<BTreeMap<StorageKey, String>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: StorageKey) -> Option<String> {
        self.entries.read().get(&key).cloned()
    }

    fn get_many(&self, keys: &[StorageKey]) -> Vec<Option<String>> {
        let entries = self.entries.read();
        keys.iter().map(|key| entries.get(key).cloned()).collect()
    }

    fn write_all(&self, batch: &[(StorageKey, String)]) -> Result<(), StoreError> {
        self.entries.write().extend(batch.iter().cloned());
        Ok(())
    }

    fn remove_all(&self, keys: &[StorageKey]) -> Result<(), StoreError> {
        let mut entries = self.entries.write();
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}
