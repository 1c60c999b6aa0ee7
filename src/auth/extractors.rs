//! Request-level authorization.
//!
//! [`authorize`] runs in front of the API routes. It resolves the bearer token
//! (if any) into an [`Identity`] stored in the request extensions, and rejects
//! the request outright when a token is present but does not verify. Handlers
//! that mutate state then ask for [`AuthUser`], which fails with 401 when the
//! request is anonymous.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use super::{claims::Identity, jwt::JwtKeys};
use crate::error::AppError;

/// Returns the token of an `Authorization: Bearer <token>` header.
///
/// A missing header or any other scheme yields `None`, which is "no token"
/// rather than "invalid token". Once the scheme matches, everything after it
/// is the token, so a malformed value fails verification instead of being
/// ignored.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    lazy_static! {
        static ref BEARER_RE: Regex = Regex::new(r"(?i)^\s*bearer\s+(.*\S)\s*$").unwrap();
    }
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    BEARER_RE
        .captures(value)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

pub async fn authorize(
    State(keys): State<JwtKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = match bearer_token(req.headers()) {
        Some(token) => {
            let claims = keys.verify(token).map_err(|e| {
                warn!(error = %e, "rejecting request with bad token");
                AppError::InvalidToken(e)
            })?;
            Some(Identity::from(claims))
        }
        None => None,
    };

    if let Some(identity) = identity {
        debug!(user_id = %identity.id, "request authenticated");
        req.extensions_mut().insert(identity);
    }
    Ok(next.run(req).await)
}

/// The authenticated caller. Rejects anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::AuthenticationRequired)
    }
}
