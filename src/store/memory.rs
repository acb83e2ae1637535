use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{CredentialStore, StoreError};

/// In-memory credential store. Contents vanish with the process; useful for
/// tests and for callers that opt out of persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries. Test helper.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn guard(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".into()))
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError> {
        let entries = self.guard()?;
        Ok(keys.iter().map(|k| entries.get(*k).cloned()).collect())
    }

    async fn multi_set(&self, pairs: &[(&str, String)]) -> Result<(), StoreError> {
        let mut entries = self.guard()?;
        for (key, value) in pairs {
            entries.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut entries = self.guard()?;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}
