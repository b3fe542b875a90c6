//! Typed access to the dashboard batch endpoints

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use cropsight_session::{ApiRequest, RequestError, SessionManager};

use crate::entities::Batch;

const BATCHES_PATH: &str = "/api/dashboard/batches";
const BATCH_PATH: &str = "/api/dashboard/batch";

/// Dashboard batch API failure.
#[derive(Debug, Error)]
pub enum BatchApiError {
    /// Session-level failure; the UI should head back to login for
    /// `NoSession`/`SessionExpired`.
    #[error(transparent)]
    Session(#[from] RequestError),

    #[error("dashboard API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed dashboard response: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct BatchListEnvelope {
    batches: Vec<Batch>,
}

#[derive(Debug, Deserialize)]
struct BatchEnvelope {
    batch: Batch,
}

/// Client for the dashboard batch endpoints, dispatching through the
/// session's authenticated request path.
#[derive(Clone)]
pub struct BatchesApi {
    session: Arc<SessionManager>,
}

impl BatchesApi {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// All batches belonging to the signed-in account.
    pub async fn list(&self) -> Result<Vec<Batch>, BatchApiError> {
        let response = self.session.request(ApiRequest::get(BATCHES_PATH)).await?;
        if !response.is_success() {
            return Err(BatchApiError::Api {
                status: response.status,
                message: response
                    .error_message()
                    .unwrap_or_else(|| "failed to fetch batches".to_string()),
            });
        }
        let envelope: BatchListEnvelope = response.json()?;
        Ok(envelope.batches)
    }

    /// A single batch by id.
    ///
    /// Sent with `Cache-Control: no-cache` so polling always observes
    /// the backend's current completion flags.
    pub async fn get(&self, id: &str) -> Result<Batch, BatchApiError> {
        let request =
            ApiRequest::get(format!("{BATCH_PATH}/{id}")).header("Cache-Control", "no-cache");
        let response = self.session.request(request).await?;
        if !response.is_success() {
            return Err(BatchApiError::Api {
                status: response.status,
                message: response
                    .error_message()
                    .unwrap_or_else(|| "failed to fetch batch".to_string()),
            });
        }
        let envelope: BatchEnvelope = response.json()?;
        Ok(envelope.batch)
    }
}
