//! Bearer token claims types

use serde::{Deserialize, Serialize};

/// Claims decoded from a Cropsight access token
///
/// The backend issues JS-style camelCase claim names; everything except
/// the expiry is optional on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Expires at (epoch seconds)
    pub exp: i64,
    /// Issued at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Subject (user ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Device identifier the account logged in with
    #[serde(default, rename = "mobileId", skip_serializing_if = "Option::is_none")]
    pub mobile_id: Option<String>,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Avatar image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}
