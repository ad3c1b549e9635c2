use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    middleware,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::api::{error::ApiResponse, users};
use crate::auth::{
    api as auth_api,
    middleware::{authorize_admin, authorize_member, authorize_superadmin},
    AuthState,
};
use crate::middleware::request_logging;

/// Create the application router.
///
/// API routes are served under both `/api/v1` and `/api`. A method miss on a
/// known path gets the same 404 as an unknown path.
pub fn create_router(state: AuthState, cors: CorsLayer) -> Router {
    let api = api_routes(&state);

    Router::new()
        .route("/", get(users::check).fallback(route_not_found))
        .nest("/api/v1", api.clone())
        .nest("/api", api)
        .fallback(route_not_found)
        .layer(middleware::from_fn(request_logging))
        .layer(cors)
        .with_state(state)
}

fn api_routes(state: &AuthState) -> Router<AuthState> {
    // Gates go on the matched handler only, so a method miss never hits them
    let member_gate = middleware::from_fn_with_state(state.clone(), authorize_member);
    let admin_gate = middleware::from_fn_with_state(state.clone(), authorize_admin);
    let superadmin_gate = middleware::from_fn_with_state(state.clone(), authorize_superadmin);

    // No auth
    let public = Router::new()
        .route("/register", post(users::register_member).fallback(route_not_found))
        .route("/login", post(auth_api::login).fallback(route_not_found))
        .route(
            "/login-superadmin",
            post(auth_api::login_superadmin).fallback(route_not_found),
        );

    // Member auth
    let member = Router::new().route(
        "/detailuser",
        get(users::who_am_i)
            .route_layer(member_gate)
            .fallback(route_not_found),
    );

    // Admin auth
    let admin = Router::new()
        .route(
            "/users",
            get(users::list_users)
                .route_layer(admin_gate.clone())
                .fallback(route_not_found),
        )
        .route(
            "/user/:id",
            delete(users::delete_user)
                .route_layer(admin_gate)
                .fallback(route_not_found),
        );

    // Superadmin auth
    let superadmin = Router::new().route(
        "/admins",
        post(users::register_admin)
            .route_layer(superadmin_gate)
            .fallback(route_not_found),
    );

    public.merge(member).merge(admin).merge(superadmin)
}

async fn route_not_found() -> impl IntoResponse {
    let body = ApiResponse::<()> {
        status: crate::api::error::Status::Failed,
        message: "Route not found!".to_string(),
        data: None,
        meta: None,
    };

    (StatusCode::NOT_FOUND, Json(body))
}

/// CORS for a single allowed origin, or permissive when none is configured
pub fn cors_layer(origin: Option<HeaderValue>) -> CorsLayer {
    match origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(origin))
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE]),
        None => CorsLayer::permissive(),
    }
}
