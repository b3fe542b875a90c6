//! Authentication context for session consumers
//!
//! Cheap cloneable handle over the single owned [`SessionManager`].
//! Screens and domain clients hold one of these instead of a global;
//! they read snapshots and re-derive their views, never caching
//! authentication state of their own.

use std::sync::Arc;

use cropsight_auth::TokenClaims;

use crate::error::{LoginError, RequestError};
use crate::manager::{Credentials, Session, SessionManager};
use crate::transport::{ApiRequest, ApiResponse};

/// Handle exposing authentication state and actions.
#[derive(Clone)]
pub struct AuthContext {
    manager: Arc<SessionManager>,
}

impl AuthContext {
    pub fn new(manager: Arc<SessionManager>) -> Self {
        Self { manager }
    }

    /// The underlying manager, for consumers that need request dispatch.
    pub fn manager(&self) -> &Arc<SessionManager> {
        &self.manager
    }

    /// Resolve the startup session state.
    pub async fn initialize(&self) -> Session {
        self.manager.initialize().await
    }

    /// Current session snapshot.
    pub async fn session(&self) -> Session {
        self.manager.session().await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.manager.session().await.is_authenticated
    }

    pub async fn claims(&self) -> Option<TokenClaims> {
        self.manager.session().await.claims
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Session, LoginError> {
        self.manager.login(credentials).await
    }

    pub async fn logout(&self) {
        self.manager.logout().await
    }

    /// Dispatch an authenticated request.
    pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse, RequestError> {
        self.manager.request(request).await
    }
}
