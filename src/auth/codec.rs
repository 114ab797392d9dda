//! Token Codec
//! Mission: Turn claims into compact HS256 tokens and back, refusing anything else
//!
//! Wire format is a standard three-segment JWT. The header is inspected by
//! hand before `jsonwebtoken` touches the key, so a token advertising `none`,
//! `HS512` or an asymmetric algorithm is refused without ever being verified.

use crate::auth::{error::AuthError, models::Claims};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// The only algorithm this service issues or accepts.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;
const SIGNING_ALGORITHM_NAME: &str = "HS256";

/// Process-wide HMAC key, built once at start-up.
pub struct SigningSecret {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningSecret {
    pub fn new(secret: &str) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Signing("signing secret is empty".to_string()));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        })
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Claims exactly as they appear in the payload segment.
///
/// Everything is optional so a verified-but-incomplete payload can be
/// reported precisely instead of failing as one opaque JSON error.
#[derive(Debug, Default, Deserialize)]
pub struct RawClaims {
    pub sub: Option<serde_json::Value>,
    pub token_kind: Option<String>,
    pub iat: Option<i64>,
    pub exp: Option<i64>,
    pub jti: Option<String>,
}

#[derive(Serialize)]
struct OutgoingClaims<'a> {
    sub: String,
    token_kind: &'a str,
    iat: i64,
    exp: i64,
    jti: String,
}

#[derive(Deserialize)]
struct EnvelopeHeader {
    alg: Option<String>,
}

/// HS256 encoder/decoder bound to one [`SigningSecret`].
pub struct TokenCodec {
    secret: SigningSecret,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: SigningSecret) -> Self {
        // Expiry is judged by the validator against an explicit clock,
        // so jsonwebtoken only checks algorithm + signature here.
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        Self { secret, validation }
    }

    /// Sign claims into a compact token string.
    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        let outgoing = OutgoingClaims {
            sub: claims.subject.to_string(),
            token_kind: claims.kind.as_str(),
            iat: claims.issued_at.timestamp(),
            exp: claims.expires_at.timestamp(),
            jti: claims.token_id.to_string(),
        };

        encode(
            &Header::new(SIGNING_ALGORITHM),
            &outgoing,
            &self.secret.encoding,
        )
        .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Check the envelope, pin the algorithm, verify the signature and
    /// return the raw payload. Expiry and subject are left to the caller.
    pub fn decode(&self, token: &str) -> Result<RawClaims, AuthError> {
        check_envelope(token)?;

        decode::<RawClaims>(token, &self.secret.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    AuthError::UnsupportedAlgorithm("unknown".to_string())
                }
                _ => AuthError::MalformedToken,
            })
    }
}

/// Structural checks and algorithm pinning, done before any key is used.
fn check_envelope(token: &str) -> Result<(), AuthError> {
    if token.trim().is_empty() {
        return Err(AuthError::MalformedToken);
    }

    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 || segments[0].is_empty() {
        return Err(AuthError::MalformedToken);
    }

    let header_bytes = URL_SAFE_NO_PAD
        .decode(segments[0])
        .map_err(|_| AuthError::MalformedToken)?;
    let header: EnvelopeHeader =
        serde_json::from_slice(&header_bytes).map_err(|_| AuthError::MalformedToken)?;

    match header.alg.as_deref() {
        Some(SIGNING_ALGORITHM_NAME) => Ok(()),
        Some(other) => Err(AuthError::UnsupportedAlgorithm(other.to_string())),
        None => Err(AuthError::UnsupportedAlgorithm("<absent>".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::{Identity, TokenKind};
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn codec(secret: &str) -> TokenCodec {
        TokenCodec::new(SigningSecret::new(secret).unwrap())
    }

    fn sample_claims() -> Claims {
        let issued_at = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        Claims {
            subject: Identity::generate(),
            kind: TokenKind::Access,
            issued_at,
            expires_at: issued_at + Duration::minutes(30),
            token_id: Uuid::new_v4(),
        }
    }

    fn b64(json: &str) -> String {
        URL_SAFE_NO_PAD.encode(json.as_bytes())
    }

    #[test]
    fn test_encode_produces_three_segment_hs256_token() {
        let token = codec("test-secret-key-12345").encode(&sample_claims()).unwrap();

        let segments: Vec<&str> = token.split('.').collect();
        assert_eq!(segments.len(), 3);

        let header = URL_SAFE_NO_PAD.decode(segments[0]).unwrap();
        let header: serde_json::Value = serde_json::from_slice(&header).unwrap();
        assert_eq!(header["alg"], "HS256");
    }

    #[test]
    fn test_payload_carries_canonical_subject_and_kind() {
        let claims = sample_claims();
        let raw = codec("k").decode(&codec("k").encode(&claims).unwrap()).unwrap();

        assert_eq!(
            raw.sub.as_ref().and_then(|v| v.as_str()),
            Some(claims.subject.to_string().as_str())
        );
        assert_eq!(raw.token_kind.as_deref(), Some("access"));
        assert_eq!(raw.exp, Some(claims.expires_at.timestamp()));
        assert_eq!(raw.jti, Some(claims.token_id.to_string()));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(SigningSecret::new(""), Err(AuthError::Signing(_))));
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = SigningSecret::new("hunter2").unwrap();
        assert_eq!(format!("{secret:?}"), "SigningSecret(<redacted>)");
    }

    #[test]
    fn test_envelope_rejects_malformed_input() {
        let c = codec("k");
        assert_eq!(c.decode("").unwrap_err(), AuthError::MalformedToken);
        assert_eq!(c.decode("   ").unwrap_err(), AuthError::MalformedToken);
        assert_eq!(c.decode("abc").unwrap_err(), AuthError::MalformedToken);
        assert_eq!(c.decode("a.b").unwrap_err(), AuthError::MalformedToken);
        assert_eq!(c.decode("a.b.c.d").unwrap_err(), AuthError::MalformedToken);
        // Header segment that is not base64url JSON
        assert_eq!(c.decode("%%%.e30.sig").unwrap_err(), AuthError::MalformedToken);
        assert_eq!(
            c.decode(&format!("{}.e30.sig", b64("not json"))).unwrap_err(),
            AuthError::MalformedToken
        );
    }

    #[test]
    fn test_alg_none_rejected_before_verification() {
        let token = format!(
            "{}.{}.",
            b64(r#"{"alg":"none","typ":"JWT"}"#),
            b64(r#"{"sub":"x","exp":99999999999}"#)
        );
        assert_eq!(
            codec("k").decode(&token).unwrap_err(),
            AuthError::UnsupportedAlgorithm("none".to_string())
        );
    }

    #[test]
    fn test_absent_alg_rejected() {
        let token = format!("{}.{}.sig", b64(r#"{"typ":"JWT"}"#), b64("{}"));
        assert_eq!(
            codec("k").decode(&token).unwrap_err(),
            AuthError::UnsupportedAlgorithm("<absent>".to_string())
        );
    }

    #[test]
    fn test_other_hmac_algorithm_rejected_even_with_right_key() {
        // Correctly signed with the shared secret, but under HS512
        let token = encode(
            &Header::new(Algorithm::HS512),
            &serde_json::json!({ "sub": Uuid::new_v4().to_string(), "exp": 99999999999i64 }),
            &EncodingKey::from_secret(b"k"),
        )
        .unwrap();

        assert_eq!(
            codec("k").decode(&token).unwrap_err(),
            AuthError::UnsupportedAlgorithm("HS512".to_string())
        );
    }

    #[test]
    fn test_asymmetric_algorithm_rejected() {
        let token = format!(
            "{}.{}.{}",
            b64(r#"{"alg":"RS256","typ":"JWT"}"#),
            b64(r#"{"sub":"x"}"#),
            b64("forged")
        );
        assert_eq!(
            codec("k").decode(&token).unwrap_err(),
            AuthError::UnsupportedAlgorithm("RS256".to_string())
        );
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let token = codec("secret1").encode(&sample_claims()).unwrap();
        assert_eq!(
            codec("secret2").decode(&token).unwrap_err(),
            AuthError::InvalidSignature
        );
    }

    #[test]
    fn test_verified_non_json_payload_is_malformed() {
        // Valid HS256 signature over a payload that is not a JSON object
        let header = b64(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = b64(r#""just a string""#);
        let message = format!("{header}.{payload}");
        let signature = jsonwebtoken::crypto::sign(
            message.as_bytes(),
            &EncodingKey::from_secret(b"k"),
            SIGNING_ALGORITHM,
        )
        .unwrap();
        let token = format!("{message}.{signature}");

        assert_eq!(codec("k").decode(&token).unwrap_err(), AuthError::MalformedToken);
    }
}
