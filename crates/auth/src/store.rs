//! Durable token storage
//!
//! The session layer persists the access token, its decoded claims, and
//! the refresh credential between launches. Two implementations: a
//! file-backed store for devices and an in-memory store for tests.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::claims::TokenClaims;
use crate::error::StoreError;
use crate::validator;

const SESSION_FILE: &str = "session.json";

/// Persisted session document
///
/// Written as a single document so a crash can never leave the token
/// present and the claims missing, or vice versa.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    claims: Option<TokenClaims>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

/// Durable persistence of the current token and its decoded claims.
pub trait TokenStore: Send + Sync {
    /// Persist an access token, deriving and persisting its claims.
    ///
    /// A token that cannot be decoded is still persisted; the caller sees
    /// `Ok(None)` and treats the claims as degraded.
    fn put(&self, token: &str) -> Result<Option<TokenClaims>, StoreError>;

    /// Persist the refresh credential alongside the access token.
    fn put_refresh_token(&self, token: &str) -> Result<(), StoreError>;

    /// Last persisted access token, if any.
    fn access_token(&self) -> Result<Option<String>, StoreError>;

    /// Claims derived from the last persisted access token, if any.
    fn claims(&self) -> Result<Option<TokenClaims>, StoreError>;

    /// Last persisted refresh credential, if any.
    fn refresh_token(&self) -> Result<Option<String>, StoreError>;

    /// Remove token, claims, and refresh credential in one operation.
    fn clear(&self) -> Result<(), StoreError>;
}

/// File-backed token store under an app-private directory.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store rooted at `dir`; the directory is created if absent.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(SESSION_FILE),
        })
    }

    fn load(&self) -> Result<StoredSession, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoredSession::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, session: &StoredSession) -> Result<(), StoreError> {
        // Write-then-rename keeps the document whole across a crash.
        let tmp = self.path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(session)?;
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn put(&self, token: &str) -> Result<Option<TokenClaims>, StoreError> {
        let mut session = self.load()?;
        let claims = match validator::decode(token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::warn!(error = %e, "persisting token without decodable claims");
                None
            }
        };
        session.access_token = Some(token.to_string());
        session.claims = claims.clone();
        self.save(&session)?;
        Ok(claims)
    }

    fn put_refresh_token(&self, token: &str) -> Result<(), StoreError> {
        let mut session = self.load()?;
        session.refresh_token = Some(token.to_string());
        self.save(&session)
    }

    fn access_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.access_token)
    }

    fn claims(&self) -> Result<Option<TokenClaims>, StoreError> {
        Ok(self.load()?.claims)
    }

    fn refresh_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.refresh_token)
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory token store for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    session: Mutex<StoredSession>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StoredSession>, StoreError> {
        self.session.lock().map_err(|e| {
            StoreError::Io(std::io::Error::other(format!("session lock poisoned: {e}")))
        })
    }
}

impl TokenStore for MemoryTokenStore {
    fn put(&self, token: &str) -> Result<Option<TokenClaims>, StoreError> {
        let claims = match validator::decode(token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::warn!(error = %e, "persisting token without decodable claims");
                None
            }
        };
        let mut session = self.lock()?;
        session.access_token = Some(token.to_string());
        session.claims = claims.clone();
        Ok(claims)
    }

    fn put_refresh_token(&self, token: &str) -> Result<(), StoreError> {
        self.lock()?.refresh_token = Some(token.to_string());
        Ok(())
    }

    fn access_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.access_token.clone())
    }

    fn claims(&self) -> Result<Option<TokenClaims>, StoreError> {
        Ok(self.lock()?.claims.clone())
    }

    fn refresh_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.refresh_token.clone())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.lock()? = StoredSession::default();
        Ok(())
    }
}
