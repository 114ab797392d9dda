//! Auth Flow
//! Mission: Compose verifier, issuer and validator into login and refresh

use crate::auth::{
    credentials::CredentialVerifier,
    error::AuthError,
    jwt::JwtHandler,
    models::{TokenKind, TokenPair},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct AuthFlow {
    verifier: CredentialVerifier,
    jwt: Arc<JwtHandler>,
}

impl AuthFlow {
    pub fn new(verifier: CredentialVerifier, jwt: Arc<JwtHandler>) -> Self {
        Self { verifier, jwt }
    }

    /// Email/password login. Blocking (store read + bcrypt).
    pub fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let identity = self.verifier.verify(email, password)?;
        self.jwt.issue_pair(identity)
    }

    /// Exchange a refresh token for a brand-new pair.
    ///
    /// The presented refresh token is not revoked; it stays usable until its
    /// own `exp`. There is no server-side state to revoke it in.
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        self.refresh_at(refresh_token, Utc::now())
    }

    pub fn refresh_at(
        &self,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AuthError> {
        let claims = self
            .jwt
            .validate_kind_at(refresh_token, TokenKind::Refresh, now)?;
        self.jwt.issue_pair_at(claims.subject, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::tests::{MemoryStore, TEST_COST};
    use chrono::Duration;

    fn flow() -> (AuthFlow, Arc<JwtHandler>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default().with_user("a@b.com", "correct"));
        let jwt = Arc::new(JwtHandler::from_secret("flow-test-secret").unwrap());
        let verifier = CredentialVerifier::new(store.clone(), TEST_COST).unwrap();
        (AuthFlow::new(verifier, jwt.clone()), jwt, store)
    }

    #[test]
    fn test_login_returns_two_distinct_valid_tokens() {
        let (flow, jwt, store) = flow();
        let expected = store.identity_of("a@b.com");

        let pair = flow.login("a@b.com", "correct").unwrap();
        assert_ne!(pair.access_token, pair.refresh_token);
        assert_eq!(pair.access_token.split('.').count(), 3);
        assert_eq!(pair.refresh_token.split('.').count(), 3);

        let access = jwt.validate(&pair.access_token).unwrap();
        let refresh = jwt.validate(&pair.refresh_token).unwrap();
        assert_eq!(access.subject, expected);
        assert_eq!(refresh.subject, expected);
        assert_eq!(access.kind, TokenKind::Access);
        assert_eq!(refresh.kind, TokenKind::Refresh);
    }

    #[test]
    fn test_login_failures_are_uniform() {
        let (flow, _jwt, _store) = flow();

        let wrong_password = flow.login("a@b.com", "nope").unwrap_err();
        let unknown_email = flow.login("x@y.com", "correct").unwrap_err();
        assert_eq!(wrong_password, AuthError::InvalidCredentials);
        assert_eq!(unknown_email, AuthError::InvalidCredentials);
    }

    #[test]
    fn test_refresh_rotates_pair_for_same_identity() {
        let (flow, jwt, store) = flow();
        let expected = store.identity_of("a@b.com");
        let original = flow.login("a@b.com", "correct").unwrap();

        let rotated = flow.refresh(&original.refresh_token).unwrap();
        assert_ne!(rotated.refresh_token, original.refresh_token);

        let access = jwt
            .validate_kind(&rotated.access_token, TokenKind::Access)
            .unwrap();
        assert_eq!(access.subject, expected);
    }

    #[test]
    fn test_old_refresh_token_still_valid_after_rotation() {
        let (flow, _jwt, _store) = flow();
        let original = flow.login("a@b.com", "correct").unwrap();

        flow.refresh(&original.refresh_token).unwrap();
        // Stateless: nothing remembers that this one was already used
        assert!(flow.refresh(&original.refresh_token).is_ok());
    }

    #[test]
    fn test_refresh_rejects_access_token() {
        let (flow, _jwt, _store) = flow();
        let pair = flow.login("a@b.com", "correct").unwrap();

        assert_eq!(
            flow.refresh(&pair.access_token).unwrap_err(),
            AuthError::WrongTokenKind {
                expected: TokenKind::Refresh,
                found: TokenKind::Access,
            }
        );
    }

    #[test]
    fn test_refresh_rejects_expired_and_garbage() {
        let (flow, jwt, store) = flow();
        let identity = store.identity_of("a@b.com");
        let issued = Utc::now();
        let refresh = jwt
            .issue_at(identity, TokenKind::Refresh, issued)
            .unwrap();

        let after_a_week = issued + Duration::days(8);
        assert_eq!(
            flow.refresh_at(&refresh, after_a_week).unwrap_err(),
            AuthError::Expired
        );
        assert_eq!(
            flow.refresh("").unwrap_err(),
            AuthError::MalformedToken
        );
    }
}
