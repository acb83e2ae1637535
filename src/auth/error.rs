use thiserror::Error;

use crate::api::ApiError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Authentication failed: {0}")]
    Auth(#[from] ApiError),

    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),

    #[error("Credential store timed out")]
    StoreTimeout,

    #[error("Could not encode session for storage: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SessionError {
    /// True when the failure came from the auth service rejecting the
    /// credentials, as opposed to local persistence trouble. Screens show
    /// these as a generic "invalid credentials" alert.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, SessionError::Auth(_))
    }
}
