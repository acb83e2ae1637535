//! Durable key-value storage for session credentials.
//!
//! The session manager persists its token and user profile through the
//! [`CredentialStore`] trait, a batch-oriented string key-value interface.
//! Three backends are provided:
//! - [`MemoryStore`]: process-local map, used in tests and as a throwaway
//!   default
//! - [`FileStore`]: single JSON file on disk
//! - [`KeyringStore`]: OS keychain, one entry per key
//!
//! Values are opaque to the store; the manager decides what goes under
//! which key.

pub mod file;
pub mod keyring;
pub mod memory;

pub use file::FileStore;
pub use keyring::KeyringStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

/// Storage key for the raw session token.
pub const TOKEN_KEY: &str = "latchkey:token";

/// Storage key for the serialized user profile.
pub const USER_KEY: &str = "latchkey:user";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("keychain error: {0}")]
    Keyring(#[from] ::keyring::Error),

    #[error("corrupt store contents: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("store backend unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous batch key-value store for credential material.
///
/// All operations take a batch of keys so a token/user pair can be issued
/// together; backends should apply a batch as a unit where they can.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch the values for `keys`, in order; absent keys yield `None`.
    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError>;

    /// Write all `pairs`. Existing values are overwritten.
    async fn multi_set(&self, pairs: &[(&str, String)]) -> Result<(), StoreError>;

    /// Remove `keys`. Removing an absent key is not an error.
    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StoreError>;
}
