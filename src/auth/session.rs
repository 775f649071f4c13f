//! Signed session tokens.
//!
//! A token is `<hex(claims json)>.<hex(HMAC-SHA256(claims json))>`. Verification checks
//! the tag in constant time before the claims are parsed, then checks expiry.

use crate::{
    config::session::SessionConfig,
    entities::user,
    errors::{Error, Result},
};
use chrono::{Duration, Utc};
use ring::hmac::{self, Key};
use serde::{Deserialize, Serialize};

/// What a session token asserts about its holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Internal user id
    pub user_id: i64,
    /// Provider identifier
    pub external_id: String,
    /// Display name at login
    pub display_name: String,
    /// Avatar URL at login
    pub avatar_url: Option<String>,
    /// Unix timestamp after which the token is refused
    pub expires_at: i64,
}

/// Issues and verifies session tokens.
pub struct SessionSigner {
    key: Key,
    ttl: Duration,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionSigner {
    /// Creates a signer from raw key material and a token lifetime.
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            key: Key::new(hmac::HMAC_SHA256, secret),
            ttl,
        }
    }

    /// Creates a signer from loaded session settings.
    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.secret.as_bytes(), Duration::days(config.ttl_days))
    }

    /// Issues a token for `user`, valid for the configured lifetime.
    pub fn issue(&self, user: &user::Model) -> Result<String> {
        let claims = SessionClaims {
            user_id: user.id,
            external_id: user.external_id.clone(),
            display_name: user.display_name.clone(),
            avatar_url: user.avatar_url.clone(),
            expires_at: (Utc::now() + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    /// Signs arbitrary claims.
    pub fn sign(&self, claims: &SessionClaims) -> Result<String> {
        let payload = serde_json::to_vec(claims).map_err(|e| Error::Config {
            message: format!("Failed to encode session claims: {e}"),
        })?;
        let tag = hmac::sign(&self.key, &payload);
        Ok(format!("{}.{}", hex::encode(&payload), hex::encode(tag.as_ref())))
    }

    /// Verifies a token and returns its claims.
    ///
    /// # Errors
    /// Returns [`Error::Unauthenticated`] for malformed, tampered or expired tokens.
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        let unauthenticated = |reason: &str| Error::Unauthenticated {
            reason: reason.to_string(),
        };

        let (payload_hex, tag_hex) = token
            .split_once('.')
            .ok_or_else(|| unauthenticated("malformed token"))?;
        let payload = hex::decode(payload_hex).map_err(|_| unauthenticated("malformed token"))?;
        let tag = hex::decode(tag_hex).map_err(|_| unauthenticated("malformed token"))?;

        hmac::verify(&self.key, &payload, &tag).map_err(|_| unauthenticated("bad signature"))?;

        let claims: SessionClaims =
            serde_json::from_slice(&payload).map_err(|_| unauthenticated("malformed claims"))?;
        if claims.expires_at <= Utc::now().timestamp() {
            return Err(unauthenticated("session expired"));
        }

        Ok(claims)
    }
}
