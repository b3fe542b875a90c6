//! End-to-end session lifecycle: startup restoration, login, logout.

use std::sync::Arc;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use cropsight_auth::{FileTokenStore, MemoryTokenStore, TokenStore};
use cropsight_session::mock::MockTransport;
use cropsight_session::{ApiRequest, Credentials, RequestError, SessionManager};

fn mint_token(exp: i64, email: &str) -> String {
    let claims = serde_json::json!({
        "exp": exp,
        "email": email,
        "mobileId": "u1",
        "sub": "user-1",
    });
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(b"backend-only-secret");
    encode(&header, &claims, &key).expect("failed to encode token")
}

fn credentials() -> Credentials {
    Credentials {
        email: "a@b.com".to_string(),
        mobile_id: "u1".to_string(),
    }
}

#[test_log::test(tokio::test)]
async fn login_establishes_an_authenticated_session() {
    let transport = MockTransport::new();
    let store = Arc::new(MemoryTokenStore::new());
    let manager = SessionManager::new(Arc::new(transport.clone()), store.clone());
    manager.initialize().await;

    let token = mint_token(chrono::Utc::now().timestamp() + 3600, "a@b.com");
    transport.respond(
        200,
        serde_json::json!({"accessToken": token, "refreshToken": "refresh-1"}),
    );

    let session = manager.login(&credentials()).await.unwrap();

    assert!(session.is_authenticated);
    assert!(!session.is_loading);
    let claims = session.claims.expect("claims derived from token");
    assert_eq!(claims.email.as_deref(), Some("a@b.com"));
    assert_eq!(claims.mobile_id.as_deref(), Some("u1"));

    // Token and refresh credential both persisted.
    assert_eq!(store.access_token().unwrap().as_deref(), Some(token.as_str()));
    assert_eq!(store.refresh_token().unwrap().as_deref(), Some("refresh-1"));

    // The login request itself carried no bearer header.
    let login_request = &transport.recorded_requests()[0];
    assert_eq!(login_request.path, "/api/auth/login");
    assert_eq!(login_request.authorization(), None);
}

#[tokio::test]
async fn initialize_restores_a_valid_persisted_session() {
    let store = Arc::new(MemoryTokenStore::new());
    store
        .put(&mint_token(
            chrono::Utc::now().timestamp() + 3600,
            "a@b.com",
        ))
        .unwrap();

    let transport = MockTransport::new();
    let manager = SessionManager::new(Arc::new(transport.clone()), store);

    let session = manager.initialize().await;

    assert!(session.is_authenticated);
    assert_eq!(
        session.claims.unwrap().email.as_deref(),
        Some("a@b.com")
    );
    // Restoration is purely local.
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn initialize_after_clear_resolves_unauthenticated() {
    let store = Arc::new(MemoryTokenStore::new());
    store
        .put(&mint_token(
            chrono::Utc::now().timestamp() + 3600,
            "a@b.com",
        ))
        .unwrap();
    store.clear().unwrap();

    let manager = SessionManager::new(Arc::new(MockTransport::new()), store);

    let session = manager.initialize().await;
    assert!(!session.is_authenticated);
}

#[tokio::test]
async fn stale_persisted_token_is_rejected_before_any_request() {
    // Token expired ten seconds ago; it must never leave the device.
    let store = Arc::new(MemoryTokenStore::new());
    store
        .put(&mint_token(
            chrono::Utc::now().timestamp() - 10,
            "a@b.com",
        ))
        .unwrap();

    let transport = MockTransport::new();
    let manager = SessionManager::new(Arc::new(transport.clone()), store.clone());

    let session = manager.initialize().await;
    assert!(!session.is_authenticated);
    // The invalid token was also evicted from storage.
    assert_eq!(store.access_token().unwrap(), None);

    let result = manager.request(ApiRequest::get("/x")).await;
    assert!(matches!(result, Err(RequestError::NoSession)));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn logout_notifies_backend_and_clears_persisted_state() {
    let transport = MockTransport::new();
    let store = Arc::new(MemoryTokenStore::new());
    let manager = SessionManager::new(Arc::new(transport.clone()), store.clone());
    manager.initialize().await;

    let token = mint_token(chrono::Utc::now().timestamp() + 3600, "a@b.com");
    transport.respond(200, serde_json::json!({"accessToken": token}));
    manager.login(&credentials()).await.unwrap();

    transport.respond(200, serde_json::json!({}));
    manager.logout().await;

    assert!(!manager.session().await.is_authenticated);
    assert_eq!(store.access_token().unwrap(), None);
    assert_eq!(store.claims().unwrap(), None);

    let notify = transport
        .recorded_requests()
        .into_iter()
        .find(|request| request.path == "/api/auth/logout")
        .expect("logout notification sent");
    assert_eq!(
        notify.authorization(),
        Some(format!("Bearer {token}").as_str())
    );
}

#[tokio::test]
async fn session_survives_a_process_restart_via_the_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let token = mint_token(chrono::Utc::now().timestamp() + 3600, "a@b.com");

    // First process: log in, persisting through the file store.
    {
        let transport = MockTransport::new();
        transport.respond(200, serde_json::json!({"accessToken": token}));
        let store = Arc::new(FileTokenStore::new(dir.path()).unwrap());
        let manager = SessionManager::new(Arc::new(transport), store);
        manager.initialize().await;
        manager.login(&credentials()).await.unwrap();
    }

    // Second process: restoration needs no network.
    let transport = MockTransport::new();
    let store = Arc::new(FileTokenStore::new(dir.path()).unwrap());
    let manager = SessionManager::new(Arc::new(transport.clone()), store);

    let session = manager.initialize().await;
    assert!(session.is_authenticated);
    assert_eq!(
        session.claims.unwrap().email.as_deref(),
        Some("a@b.com")
    );
    assert_eq!(transport.request_count(), 0);
}
