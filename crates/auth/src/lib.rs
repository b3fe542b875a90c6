//! Token handling for the Cropsight client
//!
//! Provides the decoded claims type, pure token validity checks, and the
//! durable token store the session layer persists through. Nothing in
//! this crate performs network I/O.

mod claims;
mod error;
mod store;
pub mod validator;

pub use claims::TokenClaims;
pub use error::{DecodeError, StoreError};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
