//! Pure token validity decisions
//!
//! The client never holds the backend's signing secret, so claims are
//! decoded without signature verification; trust in the token comes from
//! the backend rejecting it server-side. Everything here is a pure
//! function of a token string and a clock reading.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use crate::claims::TokenClaims;
use crate::error::DecodeError;

/// Decode a bearer token into its claims without verifying the signature.
///
/// Fails on anything that is not a well-formed token carrying an `exp`
/// claim.
pub fn decode(token: &str) -> Result<TokenClaims, DecodeError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    // Expiry is checked by `is_valid` against a caller-supplied clock, not
    // against the system clock hidden inside the decoder.
    validation.validate_exp = false;
    validation.validate_aud = false;

    let decoding_key = DecodingKey::from_secret(&[]);
    let token_data =
        jsonwebtoken::decode::<TokenClaims>(token, &decoding_key, &validation).map_err(|e| {
            tracing::debug!(error = %e, "token decode failed");
            DecodeError::new(e.to_string())
        })?;

    Ok(token_data.claims)
}

/// Decide whether a token is still usable at `now` (epoch seconds).
///
/// Fails closed: an undecodable token, a missing expiry, or an expiry at
/// or before `now` are all invalid. Expiry is exact-boundary exclusive.
pub fn is_valid(token: &str, now: i64) -> bool {
    match decode(token) {
        Ok(claims) => claims.exp > now,
        Err(_) => false,
    }
}
