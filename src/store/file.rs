//! Credential store backed by a single JSON file.
//!
//! The whole store is one JSON object on disk, so a batch write lands in a
//! single `fs::write` and the token/user pair can never be half-persisted
//! by this backend. The default location is
//! `<data_dir>/latchkey/credentials.json`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::task;

use super::{CredentialStore, StoreError};

/// Application name used for the default store directory.
const APP_NAME: &str = "latchkey";

/// Store file name inside the application directory.
const STORE_FILE: &str = "credentials.json";

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store backed by the given file. The file and its parents are created
    /// lazily on first write.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the platform default location.
    pub fn default_location() -> Result<Self, StoreError> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| StoreError::Unavailable("could not find data directory".into()))?;
        Ok(Self::new(data_dir.join(APP_NAME).join(STORE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(path: &Path) -> Result<HashMap<String, String>, StoreError> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_entries(path: &Path, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    async fn with_file<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T, StoreError> + Send + 'static,
    {
        let path = self.path.clone();
        task::spawn_blocking(move || op(&path))
            .await
            .map_err(|e| StoreError::Unavailable(format!("store task failed: {e}")))?
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError> {
        let keys: Vec<String> = keys.iter().map(|k| (*k).to_string()).collect();
        self.with_file(move |path| {
            let entries = Self::read_entries(path)?;
            Ok(keys.iter().map(|k| entries.get(k).cloned()).collect())
        })
        .await
    }

    async fn multi_set(&self, pairs: &[(&str, String)]) -> Result<(), StoreError> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();
        self.with_file(move |path| {
            let mut entries = Self::read_entries(path)?;
            for (key, value) in pairs {
                entries.insert(key, value);
            }
            Self::write_entries(path, &entries)
        })
        .await
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let keys: Vec<String> = keys.iter().map(|k| (*k).to_string()).collect();
        self.with_file(move |path| {
            let mut entries = Self::read_entries(path)?;
            let mut removed = false;
            for key in &keys {
                removed |= entries.remove(key).is_some();
            }
            // Nothing removed means nothing to rewrite; in particular a
            // fresh install must not grow an empty store file on sign-out.
            if removed {
                Self::write_entries(path, &entries)
            } else {
                Ok(())
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("credentials.json"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let (_dir, store) = temp_store();
        let values = store.multi_get(&["a", "b"]).await.unwrap();
        assert_eq!(values, vec![None, None]);
    }

    #[tokio::test]
    async fn test_roundtrip_survives_reopen() {
        let (_dir, store) = temp_store();
        store
            .multi_set(&[("token", "t1".into()), ("user", "{}".into())])
            .await
            .unwrap();

        // A second store over the same path sees the persisted entries.
        let reopened = FileStore::new(store.path().to_path_buf());
        let values = reopened.multi_get(&["token", "user"]).await.unwrap();
        assert_eq!(values, vec![Some("t1".to_string()), Some("{}".to_string())]);
    }

    #[tokio::test]
    async fn test_remove_is_tolerant_of_absent_keys() {
        let (_dir, store) = temp_store();
        store.multi_set(&[("token", "t1".into())]).await.unwrap();
        store.multi_remove(&["token", "user"]).await.unwrap();
        let values = store.multi_get(&["token"]).await.unwrap();
        assert_eq!(values, vec![None]);
    }

    #[tokio::test]
    async fn test_remove_on_fresh_store_writes_nothing() {
        let (_dir, store) = temp_store();
        store.multi_remove(&["token", "user"]).await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let (_dir, store) = temp_store();
        std::fs::write(store.path(), "not json").unwrap();
        let err = store.multi_get(&["token"]).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }
}
