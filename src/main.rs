//! Accounts - user registration, login and role-gated account management
//! Mission: Serve the accounts API over HTTP (or HTTPS in production)

use accounts_backend::{
    config::{AppConfig, ServerArgs},
    server::{bootstrap_superadmin, build_app, build_state},
};
use anyhow::{Context, Result};
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use dotenv::dotenv;
use std::path::Path;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    let config = AppConfig::from_args(ServerArgs::parse())?;

    info!(
        "🚀 Accounts API starting in {:?} mode",
        config.environment
    );

    let state = build_state(&config)?;

    if let Some(seed) = &config.superadmin {
        bootstrap_superadmin(&state, seed)?;
    }

    let app = build_app(&config, state);
    let addr = config.listen_addr;

    match &config.tls {
        Some(tls) => {
            let rustls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
                .await
                .context("Failed to load TLS certificate or key")?;

            info!("🎯 HTTPS server listening on https://{}", addr);

            axum_server::bind_rustls(addr, rustls_config)
                .serve(app.into_make_service())
                .await
                .context("Server error")?;
        }
        None => {
            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;

            info!("🎯 HTTP server listening on http://{}", addr);

            axum::serve(listener, app).await.context("Server error")?;
        }
    }

    Ok(())
}

/// Initialize tracing with an env-configurable filter
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "accounts_backend=debug,accounts=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate's own .env when running from elsewhere
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
