//! Session state machine
//!
//! One `SessionManager` instance owns the session for the process
//! lifetime. All state writes happen here; consumers read snapshots and
//! re-derive their views. States: `Initializing` resolves once into
//! `Unauthenticated` or `Authenticated`; logout, refresh failure, and an
//! unrecovered 401 all land back in `Unauthenticated`; a successful
//! silent refresh swaps the token in place.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tokio::sync::RwLock;

use cropsight_auth::{validator, TokenClaims, TokenStore};

use crate::error::{LoginError, RefreshError, RequestError};
use crate::transport::{ApiRequest, ApiResponse, Transport};

const LOGIN_PATH: &str = "/api/auth/login";
const REFRESH_PATH: &str = "/api/auth/refresh";
const LOGOUT_PATH: &str = "/api/auth/logout";

/// Login input; not retained after the login request completes.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    /// Device identifier sent to the backend as `mobileId`.
    pub mobile_id: String,
}

/// Read-only view of the session at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub is_authenticated: bool,
    pub claims: Option<TokenClaims>,
    pub is_loading: bool,
}

enum SessionState {
    Initializing,
    Unauthenticated,
    Authenticated { token: String, claims: TokenClaims },
}

impl SessionState {
    fn snapshot(&self) -> Session {
        match self {
            SessionState::Initializing => Session {
                is_authenticated: false,
                claims: None,
                is_loading: true,
            },
            SessionState::Unauthenticated => Session {
                is_authenticated: false,
                claims: None,
                is_loading: false,
            },
            SessionState::Authenticated { claims, .. } => Session {
                is_authenticated: true,
                claims: Some(claims.clone()),
                is_loading: false,
            },
        }
    }
}

/// Token-bearing success body of the login and refresh endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenGrant {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Orchestrates login, logout, silent refresh, and authenticated
/// request dispatch.
pub struct SessionManager {
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
    state: RwLock<SessionState>,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            transport,
            store,
            state: RwLock::new(SessionState::Initializing),
        }
    }

    /// Resolve the startup state from the token store.
    ///
    /// Runs its resolution once; later calls (and concurrent callers
    /// arriving after the first resolution) just get the current
    /// snapshot. A missing, undecodable, or expired stored token clears
    /// the store and resolves to unauthenticated.
    pub async fn initialize(&self) -> Session {
        let mut state = self.state.write().await;
        if !matches!(*state, SessionState::Initializing) {
            return state.snapshot();
        }

        let resolved = match self.store.access_token() {
            Ok(Some(token)) if validator::is_valid(&token, Utc::now().timestamp()) => {
                match validator::decode(&token) {
                    Ok(claims) => {
                        tracing::info!("restored session from stored token");
                        SessionState::Authenticated { token, claims }
                    }
                    Err(_) => {
                        self.clear_store();
                        SessionState::Unauthenticated
                    }
                }
            }
            Ok(_) => {
                self.clear_store();
                SessionState::Unauthenticated
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read token store during startup");
                SessionState::Unauthenticated
            }
        };

        *state = resolved;
        state.snapshot()
    }

    /// Exchange credentials for a session.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, LoginError> {
        let body = serde_json::json!({
            "email": credentials.email,
            "mobileId": credentials.mobile_id,
        });
        let response = self
            .transport
            .execute(ApiRequest::post_json(LOGIN_PATH, body))
            .await
            .map_err(|e| LoginError::Network(e.to_string()))?;

        if !response.is_success() {
            self.set_unauthenticated().await;
            let message = response
                .error_message()
                .unwrap_or_else(|| "login failed".to_string());
            return Err(if response.status >= 500 {
                LoginError::Server(message)
            } else {
                LoginError::InvalidCredentials(message)
            });
        }

        let grant: TokenGrant = match response.json() {
            Ok(grant) => grant,
            Err(_) => {
                self.set_unauthenticated().await;
                return Err(LoginError::Server("malformed login response".to_string()));
            }
        };
        let Some(token) = grant.access_token else {
            self.set_unauthenticated().await;
            return Err(LoginError::Server(
                "login response missing access token".to_string(),
            ));
        };

        let claims = match self.store.put(&token) {
            Ok(claims) => claims,
            Err(e) => {
                // A persistence failure alone must not kill the login;
                // the session continues in memory.
                tracing::warn!(error = %e, "failed to persist access token");
                validator::decode(&token).ok()
            }
        };
        let now = Utc::now().timestamp();
        let Some(claims) = claims.filter(|claims| claims.exp > now) else {
            self.clear_store();
            self.set_unauthenticated().await;
            return Err(LoginError::Server(
                "login returned an unusable access token".to_string(),
            ));
        };

        if let Some(refresh_token) = grant.refresh_token {
            if let Err(e) = self.store.put_refresh_token(&refresh_token) {
                tracing::warn!(error = %e, "failed to persist refresh token");
            }
        }

        tracing::info!(email = ?claims.email, "login succeeded");
        let mut state = self.state.write().await;
        *state = SessionState::Authenticated { token, claims };
        Ok(state.snapshot())
    }

    /// End the session: best-effort backend notification, then clear.
    ///
    /// Always lands in the unauthenticated state, whatever the backend
    /// or the store had to say about it.
    pub async fn logout(&self) {
        let token = self.access_token().await;
        if let Some(token) = token {
            let notify = ApiRequest::post(LOGOUT_PATH).bearer(&token);
            match self.transport.execute(notify).await {
                Ok(_) => tracing::debug!("backend notified of logout"),
                Err(e) => tracing::warn!(error = %e, "logout notification failed"),
            }
        }
        self.clear_store();
        self.set_unauthenticated().await;
    }

    /// Exchange the stored refresh credential for a new access token.
    ///
    /// On success the token and claims are replaced in place. A response
    /// token that fails to decode aborts the replacement and keeps the
    /// current session. Any other failure clears the session.
    pub async fn refresh(&self) -> Result<(), RefreshError> {
        let refresh_token = match self.store.refresh_token() {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.clear_store();
                self.set_unauthenticated().await;
                return Err(RefreshError::NoRefreshToken);
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read refresh token");
                self.clear_store();
                self.set_unauthenticated().await;
                return Err(RefreshError::NoRefreshToken);
            }
        };

        let body = serde_json::json!({ "refreshToken": refresh_token });
        let response = match self
            .transport
            .execute(ApiRequest::post_json(REFRESH_PATH, body))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.clear_store();
                self.set_unauthenticated().await;
                return Err(RefreshError::Network(e.to_string()));
            }
        };

        if !response.is_success() {
            self.clear_store();
            self.set_unauthenticated().await;
            let message = response
                .error_message()
                .unwrap_or_else(|| format!("token refresh failed with status {}", response.status));
            return Err(RefreshError::Server(message));
        }

        let token = match response.json::<TokenGrant>() {
            Ok(TokenGrant {
                access_token: Some(token),
                ..
            }) => token,
            _ => {
                self.clear_store();
                self.set_unauthenticated().await;
                return Err(RefreshError::Server(
                    "refresh response missing access token".to_string(),
                ));
            }
        };

        // Decode before touching anything so a bad token cannot evict a
        // working one.
        let claims = validator::decode(&token)?;
        if let Err(e) = self.store.put(&token) {
            tracing::warn!(error = %e, "failed to persist refreshed token");
        }

        tracing::debug!("silent refresh succeeded");
        let mut state = self.state.write().await;
        *state = SessionState::Authenticated { token, claims };
        Ok(())
    }

    /// Dispatch a request with the session's bearer token.
    ///
    /// Fails with [`RequestError::NoSession`] before touching the
    /// transport when no session is active. A 401 response triggers
    /// exactly one silent refresh and one retry; every other response
    /// passes through untouched. Transport failures propagate to the
    /// caller undisturbed.
    pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse, RequestError> {
        let token = self.access_token().await.ok_or(RequestError::NoSession)?;

        let response = self
            .transport
            .execute(request.clone().bearer(&token))
            .await?;
        if response.status != 401 {
            return Ok(response);
        }

        tracing::debug!(path = %request.path, "received 401, attempting silent refresh");
        if let Err(e) = self.refresh().await {
            tracing::debug!(error = %e, "silent refresh failed; session expired");
            // Refresh preserves the session on a decode failure, but an
            // unrecovered 401 always ends it.
            self.clear_store();
            self.set_unauthenticated().await;
            return Err(RequestError::SessionExpired);
        }

        let token = self
            .access_token()
            .await
            .ok_or(RequestError::SessionExpired)?;
        Ok(self.transport.execute(request.bearer(&token)).await?)
    }

    /// Current session snapshot.
    pub async fn session(&self) -> Session {
        self.state.read().await.snapshot()
    }

    /// Bearer token of the active session, if any.
    pub async fn access_token(&self) -> Option<String> {
        match &*self.state.read().await {
            SessionState::Authenticated { token, .. } => Some(token.clone()),
            _ => None,
        }
    }

    async fn set_unauthenticated(&self) {
        *self.state.write().await = SessionState::Unauthenticated;
    }

    fn clear_store(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear token store");
        }
    }
}
