use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::error::Error;
use crate::types::SessionUser;

/// Claims read from an access token payload.
///
/// The signature is NOT checked. These claims populate display fields and
/// expiry hints only and must never drive an authorization decision.
#[derive(Debug, Clone, Deserialize)]
pub struct UnverifiedClaims {
    #[serde(flatten)]
    pub user: SessionUser,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl UnverifiedClaims {
    /// Expiry instant from the `exp` claim, if present and in range.
    #[must_use]
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        self.exp
            .and_then(|exp| OffsetDateTime::from_unix_timestamp(exp).ok())
    }

    /// Whether `exp` lies at or before `now`. Tokens without `exp` never expire here.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }
}

/// Decodes the payload segment of a JWT-shaped access token without verifying it.
///
/// # Errors
///
/// Returns `Error::Token` if the token is not three dot-separated segments,
/// the payload is not base64url, or the payload lacks the user fields.
pub fn decode_unverified(token: &str) -> Result<UnverifiedClaims, Error> {
    let payload = extract_payload(token)?;
    serde_json::from_slice(&payload).map_err(|e| Error::Token(format!("invalid payload: {e}")))
}

/// Decodes the user carried by an access token, if the token is decodable.
#[must_use]
pub fn decode_user(token: &str) -> Option<SessionUser> {
    match decode_unverified(token) {
        Ok(claims) => Some(claims.user),
        Err(e) => {
            tracing::debug!(error = %e, "Access token payload not decodable");
            None
        }
    }
}

/// Extracts the raw payload bytes from a JWT-shaped token string.
pub(crate) fn extract_payload(token: &str) -> Result<Vec<u8>, Error> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(Error::Token("invalid token format".into()));
    }

    // Some issuers pad their segments; base64url in JWTs is unpadded.
    let payload_b64 = parts[1].trim_end_matches('=');
    if payload_b64.is_empty() {
        return Err(Error::Token("empty payload".into()));
    }

    URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| Error::Token("invalid payload encoding".into()))
}
