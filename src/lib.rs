//! latchkey - client-side session and auth toolkit.
//!
//! The pieces a mobile-style front-end needs to sign users in and keep them
//! signed in across restarts:
//!
//! - [`auth::SessionManager`] - owns the session state, hydrates it once
//!   from a credential store, exposes `sign_in` / `sign_out` and a watch
//!   subscription for UI re-rendering
//! - [`store`] - the `CredentialStore` trait with in-memory, JSON-file and
//!   OS-keychain backends
//! - [`api::AuthClient`] - HTTP client for the remote auth service
//!   (`POST /sessions`, `POST /users`)
//! - [`validate`] - sign-in/sign-up form validation and the per-field
//!   error map screens render from
//! - [`config`] - on-disk client configuration
//!
//! ```no_run
//! use std::sync::Arc;
//! use latchkey::api::AuthClient;
//! use latchkey::auth::{Credentials, SessionManager};
//! use latchkey::store::FileStore;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AuthClient::new("https://api.example.com")?;
//! let store = Arc::new(FileStore::default_location()?);
//! let sessions = SessionManager::new(client, store);
//!
//! sessions.hydrate().await;
//! if !sessions.is_authenticated() {
//!     sessions
//!         .sign_in(&Credentials::new("ada@example.com", "hunter2"))
//!         .await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod store;
pub mod validate;

pub use api::{ApiError, AuthClient};
pub use auth::{AuthState, Credentials, Session, SessionError, SessionManager, UserProfile};
pub use store::CredentialStore;
pub use validate::{field_map, FieldError, ValidationErrors};
