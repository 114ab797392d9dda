//! Authentication Models
//! Mission: Define the identity, claim and request/response shapes of the auth flow

use crate::auth::error::AuthError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Access tokens live for 30 minutes.
pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 30;
/// Refresh tokens live for 7 days.
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Authenticated principal, carried as the `sub` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(Uuid);

impl Identity {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for Identity {
    // Canonical form: lowercase, hyphenated
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Only the canonical form parses; braced, urn and simple encodings do not.
impl FromStr for Identity {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = Uuid::parse_str(s).map_err(|_| AuthError::InvalidSubject)?;
        if id.hyphenated().to_string() != s {
            return Err(AuthError::InvalidSubject);
        }
        Ok(Self(id))
    }
}

/// Which endpoint a token is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "access" => Some(TokenKind::Access),
            "refresh" => Some(TokenKind::Refresh),
            _ => None,
        }
    }

    /// Fixed policy lifetime for this kind of token.
    pub fn lifetime(&self) -> Duration {
        match self {
            TokenKind::Access => Duration::minutes(ACCESS_TOKEN_TTL_MINUTES),
            TokenKind::Refresh => Duration::days(REFRESH_TOKEN_TTL_DAYS),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verified token payload.
///
/// This is the whole session: nothing about it is stored server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub subject: Identity,
    pub kind: TokenKind,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Random per-token id (`jti`)
    pub token_id: Uuid,
}

/// Stored login credential, as read from the user store.
#[derive(Debug, Clone)]
pub struct Credential {
    pub identity: Identity,
    pub password_hash: String, // bcrypt hash
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Identity,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub created_at: String,
}

impl User {
    pub fn credential(&self) -> Credential {
        Credential {
            identity: self.id,
            password_hash: self.password_hash.clone(),
        }
    }
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Refresh request body
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Access/refresh pair returned by login and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64, // seconds until the access token expires
}

/// Registration request body
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// User response (sanitized)
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at.clone(),
        }
    }
}
