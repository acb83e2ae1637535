//! Authentication module for managing the user session lifecycle.
//!
//! This module provides:
//! - `SessionManager`: hydrate-once session state with sign-in/sign-out
//! - `AuthState`: the snapshot UI consumers subscribe to
//! - `Credentials` / `Registration`: transient request payloads
//!
//! Sessions are persisted through a pluggable credential store and restored
//! on the next launch.

pub mod error;
pub mod manager;
pub mod session;

pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{AuthState, Credentials, Registration, Session, UserProfile};
