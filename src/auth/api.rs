//! Authentication API Endpoints
//! Mission: Provide login, refresh, registration and current-user endpoints

use crate::auth::{
    credentials::CredentialVerifier,
    error::AuthError,
    flow::AuthFlow,
    jwt::JwtHandler,
    middleware::CurrentUser,
    models::{CreateUserRequest, LoginRequest, RefreshRequest, TokenPair, UserResponse},
    user_store::{CreateUserError, UserStore},
};
use crate::error::ApiError;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, warn};

const MIN_PASSWORD_LEN: usize = 8;
const INVALID_BODY: &str = "Invalid request body";
const INVALID_REFRESH_TOKEN: &str = "Invalid or expired refresh token";

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub jwt_handler: Arc<JwtHandler>,
    pub flow: Arc<AuthFlow>,
    pub bcrypt_cost: u32,
}

impl AuthState {
    pub fn new(
        user_store: Arc<UserStore>,
        jwt_handler: Arc<JwtHandler>,
        bcrypt_cost: u32,
    ) -> Result<Self, AuthError> {
        let verifier = CredentialVerifier::new(user_store.clone(), bcrypt_cost)?;
        let flow = Arc::new(AuthFlow::new(verifier, jwt_handler.clone()));

        Ok(Self {
            user_store,
            jwt_handler,
            flow,
            bcrypt_cost,
        })
    }
}

/// Malformed JSON, wrong content type, missing fields: all a plain 400.
fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        ApiError::BadRequest(INVALID_BODY.to_string())
    })
}

/// Login endpoint - POST /api/v1/auth/login
pub async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, ApiError> {
    let LoginRequest { email, password } = parse_body(payload)?;
    let email = email.trim().to_string();
    info!("🔐 Login attempt: {}", email);

    let flow = state.flow.clone();
    let attempt_email = email.clone();
    let result = tokio::task::spawn_blocking(move || flow.login(&attempt_email, &password))
        .await
        .map_err(ApiError::internal)?;

    match result {
        Ok(pair) => {
            info!("✅ Login successful: {}", email);
            Ok(Json(pair))
        }
        Err(e) => {
            warn!("❌ Failed login attempt: {}", email);
            Err(e.into())
        }
    }
}

/// Refresh endpoint - POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AuthState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, ApiError> {
    let RefreshRequest { refresh_token } = parse_body(payload)?;

    let pair = state
        .flow
        .refresh(&refresh_token)
        .map_err(|e| ApiError::from_auth(e, INVALID_REFRESH_TOKEN))?;

    info!("🔄 Token pair rotated");
    Ok(Json(pair))
}

/// Registration endpoint - POST /api/v1/users
pub async fn create_user(
    State(state): State<AuthState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let CreateUserRequest {
        name,
        email,
        password,
    } = parse_body(payload)?;
    let name = name.trim().to_string();
    let email = email.trim().to_string();

    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::BadRequest("A valid email is required".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let store = state.user_store.clone();
    let cost = state.bcrypt_cost;
    let created = tokio::task::spawn_blocking(move || {
        store.create_user(&name, &email, &password, cost)
    })
    .await
    .map_err(ApiError::internal)?;

    match created {
        Ok(user) => Ok((StatusCode::CREATED, Json(UserResponse::from_user(&user)))),
        Err(CreateUserError::EmailTaken) => {
            Err(ApiError::Conflict("Email already registered".to_string()))
        }
        Err(CreateUserError::Other(e)) => Err(ApiError::internal(format!("{e:#}"))),
    }
}

/// Get current user info - GET /api/v1/protected/me
pub async fn get_current_user(
    State(state): State<AuthState>,
    user: CurrentUser,
) -> Result<Json<UserResponse>, ApiError> {
    let store = state.user_store.clone();
    let identity = user.identity;
    let found = tokio::task::spawn_blocking(move || store.get_user_by_id(&identity))
        .await
        .map_err(ApiError::internal)?
        .map_err(|e| ApiError::internal(format!("{e:#}")))?;

    match found {
        Some(record) => Ok(Json(UserResponse::from_user(&record))),
        None => Err(ApiError::NotFound("User not found".to_string())),
    }
}
