//! Batch status polling against a scripted backend.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use cropsight_auth::MemoryTokenStore;
use cropsight_batches::{BatchWatcher, BatchesApi};
use cropsight_session::mock::MockTransport;
use cropsight_session::{
    ApiRequest, ApiResponse, Credentials, SessionManager, Transport, TransportError,
};

fn mint_token(exp: i64) -> String {
    let claims = serde_json::json!({"exp": exp, "email": "a@b.com"});
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(b"backend-only-secret");
    encode(&header, &claims, &key).expect("failed to encode token")
}

/// Wraps a transport and holds every request for a fixed delay, so a
/// poll can be caught in flight.
struct SlowTransport {
    inner: MockTransport,
    delay: Duration,
}

#[async_trait::async_trait]
impl Transport for SlowTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        tokio::time::sleep(self.delay).await;
        self.inner.execute(request).await
    }
}

async fn signed_in_manager(transport: Arc<dyn Transport>) -> Arc<SessionManager> {
    let manager = Arc::new(SessionManager::new(
        transport,
        Arc::new(MemoryTokenStore::new()),
    ));
    manager.initialize().await;
    manager
        .login(&Credentials {
            email: "a@b.com".to_string(),
            mobile_id: "u1".to_string(),
        })
        .await
        .unwrap();
    manager
}

fn batch_body(terminal: bool) -> serde_json::Value {
    serde_json::json!({"batch": {
        "id": "b1",
        "name": "north-field",
        "isModelCompleted": true,
        "isDescCompleted": terminal,
        "isAudioCompleted": terminal,
        "hasExecutionFailed": false,
    }})
}

async fn wait_until_finished(watcher: &BatchWatcher) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !watcher.is_finished() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("watcher did not finish in time");
}

#[test_log::test(tokio::test)]
async fn polling_stops_exactly_at_the_terminal_poll() {
    let transport = MockTransport::new();
    transport.respond(
        200,
        serde_json::json!({"accessToken": mint_token(chrono::Utc::now().timestamp() + 3600)}),
    );
    let manager = signed_in_manager(Arc::new(transport.clone())).await;

    transport.respond(200, batch_body(false));
    transport.respond(200, batch_body(false));
    transport.respond(200, batch_body(true));

    let watcher = BatchWatcher::spawn(
        BatchesApi::new(manager),
        "b1",
        Duration::from_millis(15),
    );
    let updates = watcher.updates();
    wait_until_finished(&watcher).await;

    // Terminal on the third poll: exactly three fetches, no fourth.
    assert_eq!(transport.requests_to("/api/dashboard/batch/b1"), 3);
    let batch = updates.borrow().clone().expect("updates published");
    assert!(batch.is_terminal());

    // Nothing further fires after the terminal poll.
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(transport.requests_to("/api/dashboard/batch/b1"), 3);
}

#[tokio::test]
async fn poll_errors_are_absorbed_and_polling_continues() {
    let transport = MockTransport::new();
    transport.respond(
        200,
        serde_json::json!({"accessToken": mint_token(chrono::Utc::now().timestamp() + 3600)}),
    );
    let manager = signed_in_manager(Arc::new(transport.clone())).await;

    transport.fail("connection reset");
    transport.respond(200, batch_body(false));
    transport.fail("connection reset");
    transport.respond(200, batch_body(true));

    let watcher = BatchWatcher::spawn(
        BatchesApi::new(manager),
        "b1",
        Duration::from_millis(15),
    );
    wait_until_finished(&watcher).await;

    assert_eq!(transport.requests_to("/api/dashboard/batch/b1"), 4);
}

#[tokio::test]
async fn teardown_during_an_in_flight_poll_publishes_nothing() {
    let inner = MockTransport::new();
    inner.respond(
        200,
        serde_json::json!({"accessToken": mint_token(chrono::Utc::now().timestamp() + 3600)}),
    );
    inner.respond(200, batch_body(false));
    let slow = SlowTransport {
        inner: inner.clone(),
        delay: Duration::from_millis(300),
    };
    let manager = signed_in_manager(Arc::new(slow)).await;

    let watcher = BatchWatcher::spawn(
        BatchesApi::new(manager),
        "b1",
        Duration::from_millis(20),
    );
    let updates = watcher.updates();

    // Let the first poll get in flight, then tear the view down.
    tokio::time::sleep(Duration::from_millis(60)).await;
    drop(watcher);

    // Even after the delayed response would have arrived, no update
    // lands.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(updates.borrow().is_none());
}
