//! End-to-end tests for the session manager: hydration, sign-in, sign-out
//! and the store/state consistency contract, with the auth service mocked
//! by wiremock.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use latchkey::api::AuthClient;
use latchkey::auth::{Credentials, SessionManager};
use latchkey::store::{CredentialStore, MemoryStore, StoreError, TOKEN_KEY, USER_KEY};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Store double whose every operation fails, for degradation tests.
struct BrokenStore;

#[async_trait]
impl CredentialStore for BrokenStore {
    async fn multi_get(&self, _keys: &[&str]) -> Result<Vec<Option<String>>, StoreError> {
        Err(StoreError::Unavailable("broken".into()))
    }

    async fn multi_set(&self, _pairs: &[(&str, String)]) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("broken".into()))
    }

    async fn multi_remove(&self, _keys: &[&str]) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("broken".into()))
    }
}

async fn seeded_store(token: &str, user: serde_json::Value) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .multi_set(&[
            (TOKEN_KEY, token.to_string()),
            (USER_KEY, user.to_string()),
        ])
        .await
        .unwrap();
    store
}

async fn mock_sign_in_ok(server: &MockServer, token: &str, user: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/sessions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": token, "user": user })),
        )
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> AuthClient {
    AuthClient::new(server.uri()).unwrap()
}

fn offline_client() -> AuthClient {
    // Nothing listens here; only used where the service must not be reached.
    AuthClient::new("http://127.0.0.1:9").unwrap()
}

#[tokio::test]
async fn hydrate_restores_persisted_session() {
    init_tracing();
    let store = seeded_store("t1", json!({"id": 1, "name": "Ada"})).await;
    let manager = SessionManager::new(offline_client(), store);

    assert!(manager.is_loading());
    manager.hydrate().await;

    assert!(!manager.is_loading());
    assert!(manager.is_authenticated());
    assert_eq!(manager.token().as_deref(), Some("t1"));
    assert_eq!(manager.user().unwrap().get("name"), Some(&json!("Ada")));
}

#[tokio::test]
async fn hydrate_without_persisted_session_is_anonymous() {
    let manager = SessionManager::with_memory_store(offline_client());
    manager.hydrate().await;

    assert!(!manager.is_loading());
    assert!(!manager.is_authenticated());
    assert!(manager.user().is_none());
}

#[tokio::test]
async fn hydrate_discards_half_persisted_session() {
    // Token present but no user profile: invalid pair, dropped entirely.
    let store = Arc::new(MemoryStore::new());
    store
        .multi_set(&[(TOKEN_KEY, "orphan".to_string())])
        .await
        .unwrap();

    let manager = SessionManager::new(offline_client(), store.clone());
    manager.hydrate().await;

    assert!(!manager.is_authenticated());
    assert!(store.is_empty(), "orphaned key should be removed");
}

#[tokio::test]
async fn hydrate_discards_corrupt_profile() {
    let store = Arc::new(MemoryStore::new());
    store
        .multi_set(&[
            (TOKEN_KEY, "t1".to_string()),
            (USER_KEY, "not json".to_string()),
        ])
        .await
        .unwrap();

    let manager = SessionManager::new(offline_client(), store.clone());
    manager.hydrate().await;

    assert!(!manager.is_authenticated());
    assert!(store.is_empty());
}

#[tokio::test]
async fn hydrate_survives_a_broken_store() {
    init_tracing();
    let manager = SessionManager::new(offline_client(), Arc::new(BrokenStore));
    manager.hydrate().await;

    // Degrades to anonymous instead of hanging or erroring.
    assert!(!manager.is_loading());
    assert!(!manager.is_authenticated());
}

#[tokio::test]
async fn hydrate_runs_once() {
    let store = seeded_store("t1", json!({"id": 1})).await;
    let manager = SessionManager::new(offline_client(), store.clone());

    manager.hydrate().await;
    assert!(manager.is_authenticated());

    // A later store wipe is invisible to repeat hydration; the load already
    // happened.
    store.multi_remove(&[TOKEN_KEY, USER_KEY]).await.unwrap();
    manager.hydrate().await;
    assert!(manager.is_authenticated());
}

#[tokio::test]
async fn sign_in_updates_state_and_store() {
    let server = MockServer::start().await;
    mock_sign_in_ok(&server, "t1", json!({"id": 1})).await;

    let store = Arc::new(MemoryStore::new());
    let manager = SessionManager::new(client_for(&server), store.clone());
    manager.hydrate().await;

    let user = manager
        .sign_in(&Credentials::new("ada@example.com", "hunter2"))
        .await
        .unwrap();

    assert_eq!(user.get("id"), Some(&json!(1)));
    assert!(manager.is_authenticated());
    assert_eq!(manager.token().as_deref(), Some("t1"));

    let values = store.multi_get(&[TOKEN_KEY, USER_KEY]).await.unwrap();
    assert_eq!(values[0].as_deref(), Some("t1"));
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(values[1].as_deref().unwrap()).unwrap(),
        json!({"id": 1})
    );
}

#[tokio::test]
async fn sign_in_failure_leaves_everything_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sessions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let manager = SessionManager::new(client_for(&server), store.clone());
    manager.hydrate().await;

    let err = manager
        .sign_in(&Credentials::new("ada@example.com", "wrong"))
        .await
        .unwrap_err();

    assert!(err.is_auth_failure());
    assert!(!manager.is_authenticated());
    assert!(store.is_empty());
}

#[tokio::test]
async fn failed_sign_in_keeps_existing_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sessions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = seeded_store("old-token", json!({"id": 1})).await;
    let manager = SessionManager::new(client_for(&server), store.clone());
    manager.hydrate().await;

    let _ = manager
        .sign_in(&Credentials::new("ada@example.com", "wrong"))
        .await
        .unwrap_err();

    assert_eq!(manager.token().as_deref(), Some("old-token"));
    let values = store.multi_get(&[TOKEN_KEY]).await.unwrap();
    assert_eq!(values[0].as_deref(), Some("old-token"));
}

#[tokio::test]
async fn sign_in_persistence_failure_does_not_change_state() {
    let server = MockServer::start().await;
    mock_sign_in_ok(&server, "t1", json!({"id": 1})).await;

    let manager = SessionManager::new(client_for(&server), Arc::new(BrokenStore));

    let err = manager
        .sign_in(&Credentials::new("ada@example.com", "hunter2"))
        .await
        .unwrap_err();

    assert!(!err.is_auth_failure());
    // The token was issued but never persisted, so memory stays anonymous.
    assert!(!manager.is_authenticated());
}

#[tokio::test]
async fn sign_out_clears_state_and_store() {
    let store = seeded_store("t1", json!({"id": 1})).await;
    let manager = SessionManager::new(offline_client(), store.clone());
    manager.hydrate().await;
    assert!(manager.is_authenticated());

    manager.sign_out().await;

    assert!(!manager.is_authenticated());
    assert!(manager.user().is_none());
    assert!(store.is_empty());
}

#[tokio::test]
async fn sign_out_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let manager = SessionManager::new(offline_client(), store.clone());

    manager.sign_out().await;
    let after_first = manager.state();
    manager.sign_out().await;

    assert_eq!(manager.state(), after_first);
    assert!(!manager.is_authenticated());
    assert!(store.is_empty());
}

#[tokio::test]
async fn mutations_wait_for_hydration() {
    // sign_out with no prior hydrate call still loads the persisted session
    // first, so hydration can never race a user action.
    let store = seeded_store("t1", json!({"id": 1})).await;
    let manager = SessionManager::new(offline_client(), store.clone());

    manager.sign_out().await;

    assert!(!manager.is_loading());
    assert!(!manager.is_authenticated());
    assert!(store.is_empty());
}

#[tokio::test]
async fn subscribers_see_lifecycle_transitions() {
    let server = MockServer::start().await;
    mock_sign_in_ok(&server, "t1", json!({"id": 1})).await;

    let manager = SessionManager::with_memory_store(client_for(&server));
    let mut updates = manager.subscribe();
    assert!(updates.borrow().loading);

    manager.hydrate().await;
    updates.changed().await.unwrap();
    {
        let state = updates.borrow_and_update();
        assert!(!state.loading);
        assert!(!state.is_authenticated());
    }

    manager
        .sign_in(&Credentials::new("ada@example.com", "hunter2"))
        .await
        .unwrap();
    updates.changed().await.unwrap();
    assert!(updates.borrow_and_update().is_authenticated());

    manager.sign_out().await;
    updates.changed().await.unwrap();
    assert!(!updates.borrow_and_update().is_authenticated());
}
