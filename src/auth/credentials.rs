//! Credential Verifier
//! Mission: Check an email/password pair without revealing which half was wrong

use crate::auth::{error::AuthError, models::Identity, user_store::CredentialStore};
use std::sync::Arc;
use uuid::Uuid;

pub struct CredentialVerifier {
    store: Arc<dyn CredentialStore>,
    // Burned on unknown emails so both failure paths cost one bcrypt check
    dummy_hash: String,
}

impl CredentialVerifier {
    /// `cost` should match the cost used for stored hashes.
    pub fn new(store: Arc<dyn CredentialStore>, cost: u32) -> Result<Self, AuthError> {
        let dummy_hash = bcrypt::hash(Uuid::new_v4().to_string(), cost)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        Ok(Self { store, dummy_hash })
    }

    /// Resolve the identity behind a credential pair.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`.
    /// Blocking: one store read plus one bcrypt verification.
    pub fn verify(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let credential = self
            .store
            .find_by_email(email)
            .map_err(|e| AuthError::Store(format!("{e:#}")))?;

        let Some(credential) = credential else {
            let _ = bcrypt::verify(password, &self.dummy_hash);
            return Err(AuthError::InvalidCredentials);
        };

        let matches = bcrypt::verify(password, &credential.password_hash)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        if matches {
            Ok(credential.identity)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}
