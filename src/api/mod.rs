//! HTTP client module for the remote auth service.
//!
//! This module provides the `AuthClient` for creating sessions (sign-in)
//! and accounts (sign-up) against the backend API.
//!
//! Authentication failures are opaque by design: the service signals them
//! with a status code and the client maps them to `ApiError` without
//! consuming structured error bodies.

pub mod client;
pub mod error;

pub use client::AuthClient;
pub use error::ApiError;
