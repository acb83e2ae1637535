//! HTTP client for the remote auth service.
//!
//! Two endpoints are consumed: `POST /sessions` exchanges credentials for a
//! bearer token plus user profile, and `POST /users` registers an account
//! (only the status code matters; the response body is discarded).

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::auth::{Credentials, Registration, Session, UserProfile};

use super::ApiError;

/// HTTP request timeout in seconds.
/// Bounds how long a sign-in can hang on a dead network before failing.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct SessionResponse {
    token: String,
    user: serde_json::Value,
}

/// Auth service client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    /// Create a client against the given service base URL
    /// (e.g. `https://api.example.com`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Exchange credentials for a session.
    ///
    /// Any non-2xx status is an authentication failure; the service does not
    /// return structured error codes we consume.
    pub async fn create_session(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let url = format!("{}/sessions", self.base_url);
        debug!(email = %credentials.email, "requesting session");

        let response = self.client.post(&url).json(credentials).send().await?;
        let response = Self::check_response(response).await?;

        let body: SessionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("malformed session body: {e}")))?;

        Ok(Session {
            token: body.token,
            user: UserProfile(body.user),
        })
    }

    /// Register a new account. Succeeds on any 2xx status.
    pub async fn create_user(&self, registration: &Registration) -> Result<(), ApiError> {
        let url = format!("{}/users", self.base_url);
        debug!(email = %registration.email, "registering account");

        let response = self.client.post(&url).json(registration).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    /// Map non-success statuses to an [`ApiError`], reading the body for
    /// context.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }
}
