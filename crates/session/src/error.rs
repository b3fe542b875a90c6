//! Session operation errors
//!
//! Every session operation returns one of these structured results;
//! callers never need a catch-all for expected auth failures.

use thiserror::Error;

use cropsight_auth::DecodeError;

use crate::transport::TransportError;

/// Login failure, already classified for the caller.
#[derive(Debug, Error)]
pub enum LoginError {
    /// The backend rejected the credentials (4xx).
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The request never reached the backend.
    #[error("network error during login: {0}")]
    Network(String),

    /// 5xx, or a success response the client cannot use.
    #[error("server error during login: {0}")]
    Server(String),
}

/// Silent refresh failure.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("no refresh credential available")]
    NoRefreshToken,

    #[error("network error during token refresh: {0}")]
    Network(String),

    #[error("server error during token refresh: {0}")]
    Server(String),

    /// The refreshed token could not be decoded; the previous token is
    /// left in place.
    #[error("refreshed token rejected: {0}")]
    Decode(#[from] DecodeError),
}

/// Authenticated request failure.
///
/// `NoSession` and `SessionExpired` tell the UI to redirect to login;
/// `Transport` means connectivity, not authorization.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("no active session")]
    NoSession,

    #[error("session expired")]
    SessionExpired,

    #[error(transparent)]
    Transport(#[from] TransportError),
}
