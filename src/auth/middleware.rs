//! Authentication Middleware
//! Mission: Protect API endpoints with bearer access-token validation

use crate::auth::{
    jwt::JwtHandler,
    models::{Claims, Identity, TokenKind},
};
use crate::error::{ApiError, INVALID_TOKEN};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

pub const MISSING_HEADER: &str = "Authorization header required";
pub const MISSING_BEARER: &str = "Bearer token not found";

/// Auth middleware that validates access tokens.
///
/// On success the verified [`Claims`] are stored in the request extensions;
/// handlers read them through [`CurrentUser`].
pub async fn auth_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // An empty header value counts as no header at all
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .filter(|value| !value.as_bytes().iter().all(u8::is_ascii_whitespace))
        .ok_or_else(|| ApiError::Unauthorized(MISSING_HEADER.to_string()))?;

    let token = header
        .to_str()
        .ok()
        .and_then(bearer_token)
        .ok_or_else(|| ApiError::Unauthorized(MISSING_BEARER.to_string()))?;

    // Validate token and extract claims
    let claims = jwt_handler
        .validate_kind(token, TokenKind::Access)
        .map_err(|e| {
            warn!(path = %req.uri().path(), reason = %e, "Rejected bearer token");
            ApiError::Unauthorized(INVALID_TOKEN.to_string())
        })?;

    // Add claims to request extensions so handlers can access them
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Token part of `Bearer <token>`, if there is a non-empty one.
fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The caller behind a protected request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub identity: Identity,
    pub claims: Claims,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .map(|claims| CurrentUser {
                identity: claims.subject,
                claims: claims.clone(),
            })
            .ok_or_else(|| ApiError::Unauthorized(MISSING_HEADER.to_string()))
    }
}
