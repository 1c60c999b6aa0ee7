use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::claims::{Claims, RawClaims};
use crate::{config::JwtConfig, state::AppState};

/// Longest token lifetime honoured; larger configured values are clamped.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365 * 10;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed or mis-signed token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("token payload lacks an identity claim")]
    MissingClaim,
}

/// Signing and verification keys for session tokens.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl: Option<Duration>,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl JwtKeys {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            ttl: config
                .ttl_minutes
                .map(|m| Duration::from_secs(m.clamp(1, MAX_TTL_MINUTES) as u64 * 60)),
        }
    }

    pub fn issue(&self, user_id: Uuid, username: &str) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let exp = self
            .ttl
            .map(|ttl| (now + TimeDuration::seconds(ttl.as_secs() as i64)).unix_timestamp() as usize);
        let claims = Claims {
            id: user_id,
            username: username.to_string(),
            iat: now.unix_timestamp() as usize,
            exp,
            iss: self.issuer.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, expires = exp.is_some(), "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        // iss is always required; exp is checked when present and required only when we issue it
        if self.ttl.is_some() {
            validation.set_required_spec_claims(&["iss", "exp"]);
        } else {
            validation.set_required_spec_claims(&["iss"]);
        }

        let raw = decode::<RawClaims>(token, &self.decoding, &validation)?.claims;
        let (Some(id), Some(username)) = (raw.id, raw.username) else {
            return Err(TokenError::MissingClaim);
        };
        debug!(user_id = %id, "jwt verified");
        Ok(Claims {
            id,
            username,
            iat: raw.iat,
            exp: raw.exp,
            iss: raw.iss,
        })
    }
}
