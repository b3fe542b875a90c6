//! Session lifecycle and authenticated request dispatch
//!
//! Owns the token lifecycle for the Cropsight client: startup
//! restoration, login, logout, silent refresh, and the single
//! 401-refresh-retry cycle every authenticated request is entitled to.
//! HTTP is reached only through the [`Transport`] trait so tests can
//! script the backend.

mod client;
mod context;
mod error;
mod manager;
pub mod mock;
mod transport;

pub use client::HttpTransport;
pub use context::AuthContext;
pub use error::{LoginError, RefreshError, RequestError};
pub use manager::{Credentials, Session, SessionManager};
pub use transport::{
    ApiRequest, ApiResponse, FilePart, Method, MultipartForm, RequestBody, Transport,
    TransportError,
};
