//! Authentication API Endpoints
//! Mission: Exchange email + password for a bearer token

use crate::api::error::{json_body, ApiError, ApiResponse, ApiResult};
use crate::auth::{
    jwt::JwtHandler,
    models::{non_blank, non_empty, normalize_email, LoginRequest, LoginResponse, User, UserRole},
    password::PasswordHasher,
    user_store::UserStore,
};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub jwt_handler: Arc<JwtHandler>,
    pub hasher: PasswordHasher,
}

impl AuthState {
    pub fn new(
        user_store: Arc<UserStore>,
        jwt_handler: Arc<JwtHandler>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            user_store,
            jwt_handler,
            hasher,
        }
    }
}

/// Login endpoint - POST /api/v1/login
pub async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let (email, password) = required_credentials(json_body(payload)?)?;

    let user = state.user_store.get_user_by_email(&email)?.ok_or_else(|| {
        warn!("❌ Login attempt for unregistered email");
        ApiError::Unauthorized("Email is not registered".to_string())
    })?;

    check_password(&state, &user, password).await?;
    issue_token(&state, &user, "login successfully")
}

/// Superadmin login endpoint - POST /api/v1/login-superadmin
pub async fn login_superadmin(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let (email, password) = required_credentials(json_body(payload)?)?;

    let user = state
        .user_store
        .get_user_by_email(&email)?
        .filter(|user| user.role == UserRole::Superadmin)
        .ok_or_else(|| {
            warn!("❌ Superadmin login refused");
            ApiError::Unauthorized("Unauthorized".to_string())
        })?;

    check_password(&state, &user, password).await?;
    issue_token(&state, &user, "Login successfully")
}

fn required_credentials(payload: LoginRequest) -> Result<(String, String), ApiError> {
    match (non_blank(payload.email), non_empty(payload.password)) {
        (Some(email), Some(password)) => Ok((normalize_email(&email), password)),
        _ => Err(ApiError::Validation("Missing fields required".to_string())),
    }
}

async fn check_password(state: &AuthState, user: &User, password: String) -> Result<(), ApiError> {
    let matches = state
        .hasher
        .verify_blocking(password, user.hashed_password.clone())
        .await?;

    if matches {
        Ok(())
    } else {
        warn!("❌ Wrong password for user {}", user.id);
        Err(ApiError::Unauthorized("Wrong password".to_string()))
    }
}

fn issue_token(state: &AuthState, user: &User, message: &str) -> ApiResult<LoginResponse> {
    let token = state.jwt_handler.generate_token(user)?;

    info!("✅ Login successful: {} ({})", user.id, user.role);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(message, LoginResponse::new(user, token))),
    ))
}
