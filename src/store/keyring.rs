//! Credential store backed by the OS keychain.
//!
//! Each storage key becomes one keyring entry under a fixed service name, so
//! tokens never touch the filesystem in plaintext. Keyring calls are
//! blocking; they run on the blocking thread pool.

use async_trait::async_trait;
use keyring::Entry;
use tokio::task;

use super::{CredentialStore, StoreError};

/// Keychain service name all entries are filed under.
const SERVICE_NAME: &str = "latchkey";

pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Store under a custom service name. Lets tests avoid clobbering real
    /// entries.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(service: &str, key: &str) -> Result<Entry, StoreError> {
        Ok(Entry::new(service, key)?)
    }

    async fn run_blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&str) -> Result<T, StoreError> + Send + 'static,
    {
        let service = self.service.clone();
        task::spawn_blocking(move || op(&service))
            .await
            .map_err(|e| StoreError::Unavailable(format!("keychain task failed: {e}")))?
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for KeyringStore {
    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError> {
        let keys: Vec<String> = keys.iter().map(|k| (*k).to_string()).collect();
        self.run_blocking(move |service| {
            let mut values = Vec::with_capacity(keys.len());
            for key in &keys {
                let entry = Self::entry(service, key)?;
                match entry.get_password() {
                    Ok(value) => values.push(Some(value)),
                    Err(keyring::Error::NoEntry) => values.push(None),
                    Err(e) => return Err(StoreError::Keyring(e)),
                }
            }
            Ok(values)
        })
        .await
    }

    async fn multi_set(&self, pairs: &[(&str, String)]) -> Result<(), StoreError> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();
        self.run_blocking(move |service| {
            for (key, value) in &pairs {
                Self::entry(service, key)?.set_password(value)?;
            }
            Ok(())
        })
        .await
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let keys: Vec<String> = keys.iter().map(|k| (*k).to_string()).collect();
        self.run_blocking(move |service| {
            for key in &keys {
                let entry = Self::entry(service, key)?;
                match entry.delete_credential() {
                    Ok(()) | Err(keyring::Error::NoEntry) => {}
                    Err(e) => return Err(StoreError::Keyring(e)),
                }
            }
            Ok(())
        })
        .await
    }
}
