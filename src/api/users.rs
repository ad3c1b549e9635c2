//! User management endpoints: registration, listing, deletion, self lookup.

use crate::api::error::{json_body, ApiError, ApiResponse, ApiResult, Meta};
use crate::auth::{
    api::AuthState,
    models::{
        non_blank, non_empty, normalize_email, ProfileResponse, RegisterRequest, User, UserResponse,
        UserRole,
    },
    user_store::NewUser,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{info, warn};

/// Self registration - POST /api/v1/register (always `member`)
pub async fn register_member(
    State(state): State<AuthState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<UserResponse> {
    register(&state, json_body(payload)?, UserRole::Member).await
}

/// Admin creation - POST /api/v1/admins (superadmin only, always `admin`)
pub async fn register_admin(
    State(state): State<AuthState>,
    Extension(creator): Extension<User>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<UserResponse> {
    let payload = json_body(payload)?;
    info!("Superadmin {} creating admin account", creator.id);
    register(&state, payload, UserRole::Admin).await
}

/// Create a user with the role fixed by the calling endpoint
async fn register(
    state: &AuthState,
    payload: RegisterRequest,
    role: UserRole,
) -> ApiResult<UserResponse> {
    let (Some(name), Some(email), Some(password)) = (
        non_empty(payload.name),
        non_blank(payload.email),
        non_empty(payload.password),
    ) else {
        return Err(ApiError::Validation("Missing required fields".to_string()));
    };

    let email = normalize_email(&email);
    if state.user_store.email_exists(&email)? {
        warn!("Registration refused: email already registered");
        return Err(email_taken());
    }

    let hashed_password = state.hasher.hash_blocking(password).await?;
    let user = state
        .user_store
        .create_user(NewUser {
            name,
            email,
            hashed_password,
            role,
        })?
        .ok_or_else(email_taken)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "create user successfully",
            UserResponse::from_user(&user),
        )),
    ))
}

fn email_taken() -> ApiError {
    ApiError::Conflict("email already registered".to_string())
}

/// Delete user - DELETE /api/v1/user/:id (admin tier)
pub async fn delete_user(
    State(state): State<AuthState>,
    Extension(actor): Extension<User>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id: i64 = id
        .trim()
        .parse()
        .map_err(|_| ApiError::Validation("Invalid parameter".to_string()))?;

    if state.user_store.get_user_by_id(id)?.is_none() {
        return Err(ApiError::NotFound("User data not found".to_string()));
    }

    if !state.user_store.delete_user(id)? {
        // Removed concurrently between the lookup and the delete
        return Err(ApiError::NotFound("User data not found".to_string()));
    }

    info!("🗑️  User {} deleted by {}", id, actor.id);

    Ok((
        StatusCode::OK,
        Json(ApiResponse::message("Delete user data successfully")),
    ))
}

/// Current user - GET /api/v1/detailuser (member tier)
pub async fn who_am_i(Extension(user): Extension<User>) -> ApiResult<ProfileResponse> {
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            "Get current user information successfully",
            ProfileResponse::from_user(&user),
        )),
    ))
}

/// List users - GET /api/v1/users (admin tier)
pub async fn list_users(State(state): State<AuthState>) -> ApiResult<Vec<UserResponse>> {
    let users: Vec<UserResponse> = state
        .user_store
        .list_users()?
        .iter()
        .map(UserResponse::from_user)
        .collect();
    let total = users.len();

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success("Get user list successfully", users).with_meta(Meta { total })),
    ))
}

/// Liveness probe - GET /
pub async fn check() -> ApiResult<()> {
    Ok((
        StatusCode::OK,
        Json(ApiResponse::message("Server is running smoothly.")),
    ))
}
