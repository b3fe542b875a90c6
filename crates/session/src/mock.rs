//! Mock transport implementation
//!
//! Records every request and replays a scripted queue of responses.
//! Thread-safe via `Arc<Mutex<>>`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::transport::{ApiRequest, ApiResponse, Transport, TransportError};

/// Scripted transport that records requests for test assertions.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    requests: Arc<Mutex<Vec<ApiRequest>>>,
    script: Arc<Mutex<VecDeque<Result<ApiResponse, TransportError>>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response with the given status.
    pub fn respond(&self, status: u16, body: serde_json::Value) {
        self.script
            .lock()
            .expect("script lock poisoned — prior test panicked")
            .push_back(Ok(ApiResponse {
                status,
                body: body.to_string().into_bytes(),
            }));
    }

    /// Queue a response with a raw byte body.
    pub fn respond_raw(&self, status: u16, body: Vec<u8>) {
        self.script
            .lock()
            .expect("script lock poisoned — prior test panicked")
            .push_back(Ok(ApiResponse { status, body }));
    }

    /// Queue a transport-level failure (no HTTP response at all).
    pub fn fail(&self, reason: &str) {
        self.script
            .lock()
            .expect("script lock poisoned — prior test panicked")
            .push_back(Err(TransportError::Request(reason.to_string())));
    }

    /// All requests executed so far.
    pub fn recorded_requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .expect("requests lock poisoned — prior test panicked")
            .clone()
    }

    /// Total number of requests executed.
    pub fn request_count(&self) -> usize {
        self.recorded_requests().len()
    }

    /// Number of requests executed against a given path.
    pub fn requests_to(&self, path: &str) -> usize {
        self.recorded_requests()
            .iter()
            .filter(|request| request.path == path)
            .count()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        tracing::debug!(path = %request.path, "mock transport: recording request");
        self.requests
            .lock()
            .map_err(|e| TransportError::Request(format!("requests lock poisoned: {e}")))?
            .push(request);
        self.script
            .lock()
            .map_err(|e| TransportError::Request(format!("script lock poisoned: {e}")))?
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Request(
                    "no scripted response remaining".to_string(),
                ))
            })
    }
}
