//! Accounts Backend Library
//!
//! User registration, bearer-token login and role-gated account management.
//! Exposes the modules used by the `accounts` binary and the integration tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod middleware;
pub mod server;
