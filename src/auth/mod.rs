//! Authentication Module
//! Mission: Secure API access with hashed credentials, JWT tokens and role tiers

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod user_store;

pub use api::AuthState;
pub use jwt::JwtHandler;
pub use middleware::{authorize_admin, authorize_member, authorize_superadmin};
pub use password::PasswordHasher;
pub use user_store::UserStore;
