//! Offline inspection of bearer tokens.
//!
//! Tokens are JWTs issued by the backend. Only the payload is decoded; the
//! signature is never verified on the client. Claims are trusted for display
//! and the expiry check only, and the server remains the authority on
//! whether a token is accepted.

use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{alphabet, Engine};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::session::UserSummary;

/// base64url that accepts payloads with or without trailing padding.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Malformed token: expected 3 segments, found {0}")]
    Malformed(usize),

    #[error("Token payload is not valid base64url: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Token payload is not valid claims JSON: {0}")]
    Claims(#[from] serde_json::Error),
}

/// Claims embedded in a TrashValue bearer token.
///
/// Only `exp` is required; the profile claims default to empty values.
/// `iat` and `exp` are NumericDates and may carry a fractional part.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub iat: f64,
    pub exp: f64,
}

impl TokenClaims {
    /// Whether the claims are expired at `now`. A token expiring exactly at
    /// the current second is still valid until that second has fully elapsed.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp * 1000.0 < now.timestamp_millis() as f64
    }

    /// Profile summary for the session state.
    pub fn user_summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }
}

/// Decode the payload claims of a token without contacting the server.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::Malformed(segments.len()));
    }

    let payload = URL_SAFE_LENIENT.decode(segments[1])?;
    Ok(serde_json::from_slice(&payload)?)
}

/// Check whether a token is expired at `now`.
///
/// Fails closed: any token that cannot be decoded counts as expired.
pub fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
    match decode_claims(token) {
        Ok(claims) => claims.is_expired_at(now),
        Err(_) => true,
    }
}
