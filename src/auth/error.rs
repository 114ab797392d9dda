//! Auth-specific error types.

use crate::auth::models::TokenKind;

/// Errors raised while verifying credentials or issuing/validating tokens.
///
/// The token variants are for logs only; the HTTP layer collapses them into
/// one generic 401 so callers learn nothing about why a token was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Empty input, wrong segment count, or undecodable header/payload.
    #[error("malformed token")]
    MalformedToken,

    /// Header declares an algorithm other than HS256 (or none at all).
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    /// `sub` claim missing or not a UUID.
    #[error("token subject is missing or invalid")]
    InvalidSubject,

    #[error("wrong token kind: expected {expected}, got {found}")]
    WrongTokenKind {
        expected: TokenKind,
        found: TokenKind,
    },

    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("credential store failure: {0}")]
    Store(String),
}

impl AuthError {
    /// Whether this error should result in a 401 (vs. a 500).
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            AuthError::Signing(_) | AuthError::Hashing(_) | AuthError::Store(_)
        )
    }
}
