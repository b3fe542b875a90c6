//! Batch resource and derived processing status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded image batch as the dashboard API reports it.
///
/// Aliases cover the field spellings older backend revisions used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, alias = "batchName")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "audioURL", skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub is_model_completed: bool,
    #[serde(default)]
    pub is_desc_completed: bool,
    #[serde(default)]
    pub is_audio_completed: bool,
    #[serde(default, alias = "execFailed")]
    pub has_execution_failed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub descriptions: Vec<BatchDescription>,
}

/// Per-language analysis summary attached to a completed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
}

/// Processing status derived from the batch completion flags.
///
/// Failure wins over everything; a batch is completed only once model,
/// description, and audio stages have all finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl BatchStatus {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl Batch {
    /// Derive the processing status from the completion flags.
    pub fn status(&self) -> BatchStatus {
        if self.has_execution_failed {
            return BatchStatus::Failed;
        }
        if self.is_model_completed && self.is_desc_completed && self.is_audio_completed {
            return BatchStatus::Completed;
        }
        if self.is_model_completed {
            return BatchStatus::Processing;
        }
        BatchStatus::Pending
    }

    /// True once no further automatic status transition can occur.
    #[mutants::skip] // Delegates to BatchStatus::is_terminal()
    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// The description for a given language code, e.g. `"En"`.
    pub fn description_for(&self, language: &str) -> Option<&BatchDescription> {
        self.descriptions
            .iter()
            .find(|description| description.language == language)
    }
}
