//! JWT Token Handler
//! Mission: Issue access/refresh tokens and validate incoming bearer tokens
//!
//! Validation is a pure function of (token, secret, now). The `*_at` variants
//! take the clock explicitly; the plain ones read `Utc::now()`.

use crate::auth::{
    codec::{RawClaims, SigningSecret, TokenCodec},
    error::AuthError,
    models::{Claims, Identity, TokenKind, TokenPair},
};
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

/// JWT Handler for token operations
pub struct JwtHandler {
    codec: TokenCodec,
}

impl JwtHandler {
    /// Create a new JWT handler around the process signing secret
    pub fn new(secret: SigningSecret) -> Self {
        Self {
            codec: TokenCodec::new(secret),
        }
    }

    /// Convenience constructor from the raw configured secret
    pub fn from_secret(secret: &str) -> Result<Self, AuthError> {
        Ok(Self::new(SigningSecret::new(secret)?))
    }

    /// Issue a token of the given kind, as of `now`
    pub fn issue_at(
        &self,
        identity: Identity,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            subject: identity,
            kind,
            issued_at: now,
            expires_at: now + kind.lifetime(),
            token_id: Uuid::new_v4(),
        };

        debug!(
            subject = %identity,
            kind = kind.as_str(),
            expires_at = %claims.expires_at,
            "Issuing token"
        );

        self.codec.encode(&claims)
    }

    pub fn issue_access(&self, identity: Identity) -> Result<String, AuthError> {
        self.issue_at(identity, TokenKind::Access, Utc::now())
    }

    pub fn issue_refresh(&self, identity: Identity) -> Result<String, AuthError> {
        self.issue_at(identity, TokenKind::Refresh, Utc::now())
    }

    /// Issue a fresh access + refresh pair for one identity
    pub fn issue_pair_at(
        &self,
        identity: Identity,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.issue_at(identity, TokenKind::Access, now)?,
            refresh_token: self.issue_at(identity, TokenKind::Refresh, now)?,
            token_type: "Bearer".to_string(),
            expires_in: TokenKind::Access.lifetime().num_seconds(),
        })
    }

    pub fn issue_pair(&self, identity: Identity) -> Result<TokenPair, AuthError> {
        self.issue_pair_at(identity, Utc::now())
    }

    /// Validate a token of either kind and extract its claims
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let raw = self.codec.decode(token)?;
        let claims = claims_from_raw(raw, now)?;

        debug!(subject = %claims.subject, kind = claims.kind.as_str(), "Validated token");

        Ok(claims)
    }

    /// Validate and additionally require a specific token kind
    pub fn validate_kind(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        self.validate_kind_at(token, expected, Utc::now())
    }

    pub fn validate_kind_at(
        &self,
        token: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Claims, AuthError> {
        let claims = self.validate_at(token, now)?;
        if claims.kind != expected {
            return Err(AuthError::WrongTokenKind {
                expected,
                found: claims.kind,
            });
        }
        Ok(claims)
    }
}

/// Payload checks after the signature verified: shape, then expiry, then subject.
fn claims_from_raw(raw: RawClaims, now: DateTime<Utc>) -> Result<Claims, AuthError> {
    let exp = raw.exp.ok_or(AuthError::MalformedToken)?;
    let iat = raw.iat.ok_or(AuthError::MalformedToken)?;
    let kind = raw
        .token_kind
        .as_deref()
        .and_then(TokenKind::parse)
        .ok_or(AuthError::MalformedToken)?;
    let token_id = raw
        .jti
        .as_deref()
        .and_then(|j| Uuid::parse_str(j).ok())
        .ok_or(AuthError::MalformedToken)?;

    if exp <= now.timestamp() {
        return Err(AuthError::Expired);
    }

    let subject = raw
        .sub
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<Identity>().ok())
        .ok_or(AuthError::InvalidSubject)?;

    let expires_at = DateTime::from_timestamp(exp, 0).ok_or(AuthError::MalformedToken)?;
    let issued_at = DateTime::from_timestamp(iat, 0).ok_or(AuthError::MalformedToken)?;

    Ok(Claims {
        subject,
        kind,
        issued_at,
        expires_at,
        token_id,
    })
}
