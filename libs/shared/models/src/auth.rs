use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub app_metadata: Option<serde_json::Value>,
    pub user_metadata: Option<serde_json::Value>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

/// Authenticated caller, resolved from a bearer token by the auth
/// middleware and attached to the request extensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Why a credential was rejected. Surfaced as the `code` field of 401
/// responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthReason {
    /// No Authorization header on the request.
    Missing,
    /// Header present but not a `Bearer <token>` with three JWT segments.
    Malformed,
    /// Signature or claims did not verify.
    Invalid,
    /// Signature verified but the token is past its expiry.
    Expired,
}

impl AuthReason {
    pub fn code(&self) -> &'static str {
        match self {
            AuthReason::Missing => "missing",
            AuthReason::Malformed => "malformed",
            AuthReason::Invalid => "invalid",
            AuthReason::Expired => "expired",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthReason::Missing => "No authorization header",
            AuthReason::Malformed => "Malformed authorization credential",
            AuthReason::Invalid => "Invalid token",
            AuthReason::Expired => "Token expired",
        }
    }
}

impl fmt::Display for AuthReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
