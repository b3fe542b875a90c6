//! Token handling errors

use thiserror::Error;

/// A token could not be parsed into claims.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("token cannot be decoded into claims: {reason}")]
pub struct DecodeError {
    pub reason: String,
}

impl DecodeError {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Durable token storage failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("token storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("token storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
