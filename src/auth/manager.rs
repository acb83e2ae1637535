//! Session manager: the single source of truth for "who is signed in".
//!
//! The manager owns an in-memory [`AuthState`] published through a watch
//! channel, hydrates it once from the credential store, and keeps the store
//! and memory in step across sign-in and sign-out. Consumers hold a
//! `SessionManager` handle (or a subscription) and never touch the store or
//! the auth service directly.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, OnceCell};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::api::AuthClient;
use crate::store::{CredentialStore, MemoryStore, StoreError, TOKEN_KEY, USER_KEY};

use super::{AuthState, Credentials, Session, SessionError, UserProfile};

/// Timeout for credential store operations in seconds.
/// A wedged store backend must not hang sign-in or hydration forever.
const STORE_TIMEOUT_SECS: u64 = 5;

/// Owns the session lifecycle for the life of the process.
///
/// State machine: `Initializing` (loading) moves to `Anonymous` or
/// `Authenticated` when hydration completes, then `sign_in` / `sign_out`
/// toggle between the latter two. A failed sign-in leaves state untouched.
///
/// Hydration runs at most once. `sign_in` and `sign_out` wait for it before
/// mutating anything, so a slow store read cannot race a user action.
pub struct SessionManager {
    client: AuthClient,
    store: Arc<dyn CredentialStore>,
    hydrated: OnceCell<()>,
    state: watch::Sender<AuthState>,
}

impl SessionManager {
    pub fn new(client: AuthClient, store: Arc<dyn CredentialStore>) -> Self {
        let (state, _) = watch::channel(AuthState::initializing());
        Self {
            client,
            store,
            hydrated: OnceCell::new(),
            state,
        }
    }

    /// Manager without durable persistence; sessions last until the process
    /// exits. Also the backbone of most tests.
    pub fn with_memory_store(client: AuthClient) -> Self {
        Self::new(client, Arc::new(MemoryStore::new()))
    }

    /// Load any persisted session and mark the state authoritative.
    ///
    /// Runs the underlying load at most once; concurrent and repeat calls
    /// wait for the first to finish. Store failures degrade to an anonymous
    /// state rather than propagating: a broken store must not lock the user
    /// out of the UI.
    pub async fn hydrate(&self) {
        self.hydrated.get_or_init(|| self.load_persisted()).await;
    }

    async fn load_persisted(&self) {
        let session = match self.read_store().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "could not read persisted session, starting anonymous");
                None
            }
        };

        match &session {
            Some(_) => debug!("restored persisted session"),
            None => debug!("no persisted session"),
        }
        self.state.send_replace(AuthState::ready(session));
    }

    async fn read_store(&self) -> Result<Option<Session>, SessionError> {
        let values = self
            .store_call(self.store.multi_get(&[TOKEN_KEY, USER_KEY]))
            .await?;
        let mut values = values.into_iter();
        let token = values.next().flatten();
        let user_json = values.next().flatten();

        match (token, user_json) {
            (Some(token), Some(user_json)) => match Session::from_entries(token, &user_json) {
                Ok(session) => Ok(Some(session)),
                Err(e) => {
                    warn!(error = %e, "persisted user profile is corrupt, discarding session");
                    self.clear_store().await;
                    Ok(None)
                }
            },
            (None, None) => Ok(None),
            // One half of the pair is an invalid state; drop both keys.
            _ => {
                warn!("persisted session is incomplete, discarding");
                self.clear_store().await;
                Ok(None)
            }
        }
    }

    /// Authenticate against the auth service and make the session durable.
    ///
    /// The session is persisted before the in-memory state is replaced, so a
    /// persistence failure surfaces as an error with memory still matching
    /// storage. Auth failures propagate untouched for the screen to report.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<UserProfile, SessionError> {
        self.hydrate().await;

        let session = self.client.create_session(credentials).await?;
        let entries = session.to_entries()?;
        let pairs: Vec<(&str, String)> = entries.into_iter().collect();
        self.store_call(self.store.multi_set(&pairs)).await?;

        debug!("sign-in complete");
        self.state.send_replace(AuthState::ready(Some(session.clone())));
        Ok(session.user)
    }

    /// Drop the session from storage and memory.
    ///
    /// Idempotent, and safe to call while anonymous: the keys are removed
    /// regardless. Store failures are logged and the in-memory state is
    /// cleared anyway; a signed-out UI with stale bytes on disk beats a
    /// signed-in UI the user asked to leave.
    pub async fn sign_out(&self) {
        self.hydrate().await;
        self.clear_store().await;
        debug!("signed out");
        self.state.send_replace(AuthState::ready(None));
    }

    async fn clear_store(&self) {
        if let Err(e) = self
            .store_call(self.store.multi_remove(&[TOKEN_KEY, USER_KEY]))
            .await
        {
            warn!(error = %e, "could not clear persisted session");
        }
    }

    async fn store_call<T>(
        &self,
        op: impl std::future::Future<Output = Result<T, StoreError>>,
    ) -> Result<T, SessionError> {
        match timeout(Duration::from_secs(STORE_TIMEOUT_SECS), op).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(SessionError::StoreTimeout),
        }
    }

    /// Current state snapshot. Not authoritative until `loading` is false.
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes. Receivers see every replacement of the
    /// state, which is how screens re-render on sign-in and sign-out.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_string)
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }
}
