use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload issued on login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,           // user ID
    pub username: String,   // username at issue time
    pub iat: usize,         // issued at (unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>, // expires at, only when a TTL is configured
    pub iss: String,        // issuer
}

/// Payload as decoded, before identity fields are checked.
#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub iat: usize,
    #[serde(default)]
    pub exp: Option<usize>,
    #[serde(default)]
    pub iss: String,
}

/// The acting user resolved from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
}

impl From<Claims> for Identity {
    fn from(c: Claims) -> Self {
        Self {
            id: c.id,
            username: c.username,
        }
    }
}
