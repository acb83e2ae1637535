use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::{TOKEN_KEY, USER_KEY};
use crate::validate::{SignInForm, SignUpForm};

/// Sign-in credentials. Transient: sent to the auth service and dropped,
/// never persisted.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

// Keep passwords out of logs and error chains.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl From<SignInForm> for Credentials {
    fn from(form: SignInForm) -> Self {
        Self {
            email: form.email,
            password: form.password,
        }
    }
}

/// Registration payload for account creation. Like [`Credentials`], never
/// persisted.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl From<SignUpForm> for Registration {
    fn from(form: SignUpForm) -> Self {
        Self {
            name: form.name,
            email: form.email,
            password: form.password,
        }
    }
}

/// Profile of the signed-in user as returned by the auth service.
///
/// The shape is owned by the server; we store and hand it back without
/// interpreting its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(pub serde_json::Value);

impl UserProfile {
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Look up a top-level profile field, if present.
    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.0.get(field)
    }
}

/// An authenticated identity: the bearer token plus the user it belongs to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

impl Session {
    /// Serialized form for the credential store: the token raw, the user as
    /// JSON. Both entries are always issued together so the store never
    /// holds one half of a session.
    pub(crate) fn to_entries(&self) -> Result<[(&'static str, String); 2], serde_json::Error> {
        let user_json = serde_json::to_string(&self.user)?;
        Ok([(TOKEN_KEY, self.token.clone()), (USER_KEY, user_json)])
    }

    /// Rebuild a session from its two stored entries.
    pub(crate) fn from_entries(token: String, user_json: &str) -> Result<Self, serde_json::Error> {
        let user: UserProfile = serde_json::from_str(user_json)?;
        Ok(Self { token, user })
    }
}

/// Snapshot of the session manager's state as seen by UI consumers.
///
/// While `loading` is true the snapshot is not yet authoritative: hydration
/// from the credential store has not finished.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub loading: bool,
    pub session: Option<Session>,
}

impl AuthState {
    pub(crate) fn initializing() -> Self {
        Self {
            loading: true,
            session: None,
        }
    }

    pub(crate) fn ready(session: Option<Session>) -> Self {
        Self {
            loading: false,
            session,
        }
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        !self.loading && self.session.is_some()
    }
}
