//! Multipart upload of a new batch

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cropsight_session::{ApiRequest, FilePart, MultipartForm, RequestError, SessionManager};

use crate::archive::{bundle_images, ArchiveError, ImageFile};

const UPLOAD_PATH: &str = "/api/dashboard/upload-batch";
const ARCHIVE_FIELD: &str = "imagesZip";
const ARCHIVE_NAME: &str = "images.zip";

/// A batch ready to upload.
#[derive(Debug, Clone)]
pub struct NewBatch {
    pub batch_name: String,
    pub crop_type: String,
    pub preferred_language: String,
    pub metadata: BatchMetadata,
    pub images: Vec<ImageFile>,
}

/// Location context captured alongside the images.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_coordinates: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Backend acknowledgement of an accepted upload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub batch_id: Option<String>,
}

/// Upload failure
#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Session(#[from] RequestError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("upload API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed upload response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Client for the batch upload endpoint.
#[derive(Clone)]
pub struct UploadsApi {
    session: Arc<SessionManager>,
}

impl UploadsApi {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Bundle the batch's images and post the multipart upload.
    ///
    /// Goes through the authenticated request path, so a 401 gets the
    /// usual single refresh-and-retry.
    pub async fn upload_batch(&self, batch: &NewBatch) -> Result<UploadReceipt, UploadError> {
        let archive = bundle_images(&batch.images)?;
        let metadata = serde_json::to_string(&batch.metadata)?;

        let form = MultipartForm::default()
            .text("batchName", batch.batch_name.clone())
            .text("cropType", batch.crop_type.clone())
            .text("imagesCount", batch.images.len().to_string())
            .text("metadata", metadata)
            .text("preferredLanguage", batch.preferred_language.clone())
            .file(FilePart {
                field: ARCHIVE_FIELD.to_string(),
                file_name: ARCHIVE_NAME.to_string(),
                content_type: "application/zip".to_string(),
                bytes: archive,
            });

        let response = self
            .session
            .request(ApiRequest::post_multipart(UPLOAD_PATH, form))
            .await?;

        if !response.is_success() {
            return Err(UploadError::Api {
                status: response.status,
                message: response
                    .error_message()
                    .unwrap_or_else(|| "upload failed".to_string()),
            });
        }

        let receipt: UploadReceipt = response.json()?;
        tracing::info!(
            batch_name = %batch.batch_name,
            images = batch.images.len(),
            "batch uploaded"
        );
        Ok(receipt)
    }
}
