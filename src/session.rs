//! Stateless signed session tokens.
//!
//! Tokens are HS256 JWTs embedding the user id, email, and an expiry.
//! There is no server-side session table: every request re-validates the
//! presented token, and logout is simply the client discarding it.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: i32,

    pub email: String,

    /// Expiry as a unix timestamp
    pub exp: i64,

    pub iat: i64,
}

#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_hours: i64,
}

impl SessionKeys {
    #[must_use]
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_hours,
        }
    }

    /// Issues a signed token for the given user.
    pub fn issue(&self, user_id: i32, email: &str) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id,
            email: email.to_string(),
            exp: (now + Duration::hours(self.ttl_hours)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to sign session token: {e}"))
    }

    /// Verifies signature and expiry. Any failure (tampered, malformed,
    /// expired) is treated as anonymous.
    #[must_use]
    pub fn validate(&self, token: &str) -> Option<SessionClaims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .ok()
    }
}
