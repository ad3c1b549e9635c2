//! Authorization Middleware
//! Mission: Gate protected routes on a verified bearer token and role tier

use crate::api::error::ApiError;
use crate::auth::{api::AuthState, models::RoleTier};
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

/// Routes open to every registered role
pub async fn authorize_member(
    State(state): State<AuthState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    authorize(&state, RoleTier::Member, req, next).await
}

/// Routes open to admins and superadmins
pub async fn authorize_admin(
    State(state): State<AuthState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    authorize(&state, RoleTier::Admin, req, next).await
}

/// Routes open to superadmins only
pub async fn authorize_superadmin(
    State(state): State<AuthState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    authorize(&state, RoleTier::Superadmin, req, next).await
}

/// Verify the bearer token, load its user and check the role tier.
///
/// On success the resolved `User` is inserted into request extensions.
async fn authorize(
    state: &AuthState,
    tier: RoleTier,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers()).inspect_err(|e| debug!("Gate rejected: {:?}", e))?;

    let claims = state.jwt_handler.validate_token(token).map_err(|e| {
        debug!("Gate rejected token: {}", e);
        AuthError::InvalidToken
    })?;

    // A user deleted after the token was issued is simply unknown here
    let user = state
        .user_store
        .get_user_by_id(claims.id)
        .map_err(|e| {
            debug!("Gate user lookup failed: {:#}", e);
            AuthError::LookupFailed
        })?
        .ok_or_else(|| {
            debug!("Gate rejected: user {} no longer exists", claims.id);
            AuthError::UnknownUser
        })?;

    if !tier.permits(user.role) {
        debug!(
            "Gate rejected: role {} not allowed for {:?} tier",
            user.role, tier
        );
        return Err(AuthError::RoleNotAllowed);
    }

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Extract the token from an exact `Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat)?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::InvalidFormat),
    }
}

/// Gate failure reasons. All of them render as the same 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidFormat,
    InvalidToken,
    UnknownUser,
    LookupFailed,
    RoleNotAllowed,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::Unauthorized("Unauthorized".to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def")), Ok("abc.def"));
        assert_eq!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingToken)
        );
        assert_eq!(
            bearer_token(&headers_with("Token abc")),
            Err(AuthError::InvalidFormat)
        );
        assert_eq!(
            bearer_token(&headers_with("Bearer ")),
            Err(AuthError::InvalidFormat)
        );
        assert_eq!(
            bearer_token(&headers_with("bearer abc")),
            Err(AuthError::InvalidFormat)
        );
    }

    #[test]
    fn test_auth_error_responses_are_uniform() {
        for err in [
            AuthError::MissingToken,
            AuthError::InvalidFormat,
            AuthError::InvalidToken,
            AuthError::UnknownUser,
            AuthError::LookupFailed,
            AuthError::RoleNotAllowed,
        ] {
            assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }
}
