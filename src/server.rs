//! Server Assembly
//! Mission: Turn a validated config into shared state and a ready router

use crate::api::routes::{cors_layer, create_router};
use crate::auth::{
    models::{normalize_email, UserRole},
    user_store::NewUser,
    AuthState, JwtHandler, PasswordHasher, UserStore,
};
use crate::config::{AppConfig, SuperadminSeed};
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use tracing::{info, warn};

/// Open the credential store and build the shared auth state
pub fn build_state(config: &AppConfig) -> Result<AuthState> {
    let user_store = Arc::new(
        UserStore::new(&config.database_path).context("Failed to initialize user store")?,
    );

    let mut jwt_handler = JwtHandler::new(&config.jwt_secret);
    match config.jwt_expiration {
        Some(ttl) => {
            info!("🔐 Tokens expire after {}h", ttl.num_hours());
            jwt_handler = jwt_handler.with_expiration(ttl);
        }
        None => warn!("⚠️  JWT_EXPIRATION_HOURS not set, issued tokens never expire"),
    }

    info!("🔐 User store initialized at: {}", config.database_path);

    Ok(AuthState::new(
        user_store,
        Arc::new(jwt_handler),
        PasswordHasher::new(config.bcrypt_cost),
    ))
}

/// Build the full application router for a config
pub fn build_app(config: &AppConfig, state: AuthState) -> Router {
    if config.cors_origin.is_none() {
        warn!("⚠️  CORS_ORIGIN not set, allowing any origin");
    }
    create_router(state, cors_layer(config.cors_origin.clone()))
}

/// Create the configured superadmin unless the email is already registered.
///
/// Returns whether an account was created.
pub fn bootstrap_superadmin(state: &AuthState, seed: &SuperadminSeed) -> Result<bool> {
    let email = normalize_email(&seed.email);

    if state.user_store.email_exists(&email)? {
        info!("Superadmin bootstrap skipped: account already exists");
        return Ok(false);
    }

    let hashed_password = state.hasher.hash(&seed.password)?;
    let created = state
        .user_store
        .create_user(NewUser {
            name: seed.name.clone(),
            email,
            hashed_password,
            role: UserRole::Superadmin,
        })?
        .is_some();

    if created {
        info!("🔐 Superadmin account created from configuration");
    }

    Ok(created)
}
