//! Server Configuration
//! Mission: Assemble and validate all settings once, before anything starts

use anyhow::{bail, Context, Result};
use axum::http::HeaderValue;
use clap::{Parser, ValueEnum};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tracing::warn;

/// Signing key used outside production when none is configured
const DEV_SIGNATURE_KEY: &str = "dev-secret-change-in-production-minimum-32-characters";

const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

/// Deployment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Development,
    Test,
    Production,
}

/// Command line / environment arguments, before validation
#[derive(Debug, Clone, Parser)]
#[command(name = "accounts")]
#[command(about = "User registration, login and role-gated account management API")]
pub struct ServerArgs {
    /// Deployment mode; production serves HTTPS and requires a signing key
    #[arg(long, env = "APP_ENV", value_enum, default_value = "development")]
    pub environment: Environment,

    /// HMAC secret used to sign bearer tokens
    #[arg(long, env = "JWT_SIGNATURE_KEY", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Token lifetime in hours; tokens never expire when unset
    #[arg(long, env = "JWT_EXPIRATION_HOURS")]
    pub jwt_expiration_hours: Option<i64>,

    /// Bcrypt work factor
    #[arg(long, env = "BCRYPT_COST", default_value = "10")]
    pub bcrypt_cost: u32,

    /// SQLite database file holding the users table
    #[arg(long, env = "DATABASE_PATH", default_value = "accounts.db")]
    pub database_path: String,

    #[arg(long, env = "LISTEN_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(long, env = "HTTP_PORT", default_value = "8000")]
    pub http_port: u16,

    #[arg(long, env = "HTTPS_PORT", default_value = "8443")]
    pub https_port: u16,

    /// PEM certificate chain (production only)
    #[arg(long, env = "SSL_CERTIFICATE_PATH")]
    pub tls_cert_path: Option<PathBuf>,

    /// PEM private key (production only)
    #[arg(long, env = "SSL_PRIVATE_KEY_PATH")]
    pub tls_key_path: Option<PathBuf>,

    /// Single allowed CORS origin; any origin when unset
    #[arg(long, env = "CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Superadmin created at startup if not yet registered
    #[arg(long, env = "SUPERADMIN_EMAIL")]
    pub superadmin_email: Option<String>,

    #[arg(long, env = "SUPERADMIN_PASSWORD", hide_env_values = true)]
    pub superadmin_password: Option<String>,

    #[arg(long, env = "SUPERADMIN_NAME", default_value = "Superadmin")]
    pub superadmin_name: String,
}

#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

#[derive(Clone)]
pub struct SuperadminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SuperadminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuperadminSeed")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Validated application configuration
#[derive(Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub jwt_secret: String,
    pub jwt_expiration: Option<chrono::Duration>,
    pub bcrypt_cost: u32,
    pub database_path: String,
    pub listen_addr: SocketAddr,
    pub tls: Option<TlsConfig>,
    pub cors_origin: Option<HeaderValue>,
    pub superadmin: Option<SuperadminSeed>,
}

impl AppConfig {
    pub fn from_args(args: ServerArgs) -> Result<Self> {
        let production = args.environment == Environment::Production;

        let jwt_secret = match args.jwt_secret {
            Some(secret) if secret.trim().is_empty() => bail!("JWT_SIGNATURE_KEY is empty"),
            Some(secret) => secret,
            None if production => bail!("JWT_SIGNATURE_KEY is required in production"),
            None => {
                warn!("⚠️  JWT_SIGNATURE_KEY not set, using development signing key");
                DEV_SIGNATURE_KEY.to_string()
            }
        };

        let jwt_expiration = match args.jwt_expiration_hours {
            Some(hours) if hours <= 0 => bail!("JWT_EXPIRATION_HOURS must be positive"),
            Some(hours) => Some(
                chrono::Duration::try_hours(hours).context("JWT_EXPIRATION_HOURS is too large")?,
            ),
            None => None,
        };

        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&args.bcrypt_cost) {
            bail!(
                "BCRYPT_COST must be between {} and {}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST
            );
        }

        let tls = if production {
            let cert_path = args
                .tls_cert_path
                .context("SSL_CERTIFICATE_PATH is required in production")?;
            let key_path = args
                .tls_key_path
                .context("SSL_PRIVATE_KEY_PATH is required in production")?;
            Some(TlsConfig {
                cert_path,
                key_path,
            })
        } else {
            None
        };

        let port = if production {
            args.https_port
        } else {
            args.http_port
        };

        let cors_origin = args
            .cors_origin
            .map(|origin| HeaderValue::from_str(&origin).context("Invalid CORS_ORIGIN"))
            .transpose()?;

        let superadmin = match (args.superadmin_email, args.superadmin_password) {
            (Some(email), Some(password)) => Some(SuperadminSeed {
                name: args.superadmin_name,
                email,
                password,
            }),
            (None, None) => None,
            _ => bail!("SUPERADMIN_EMAIL and SUPERADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            environment: args.environment,
            jwt_secret,
            jwt_expiration,
            bcrypt_cost: args.bcrypt_cost,
            database_path: args.database_path,
            listen_addr: SocketAddr::new(args.host, port),
            tls,
            cors_origin,
            superadmin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn isolated_args() -> ServerArgs {
        ServerArgs {
            environment: Environment::Development,
            jwt_secret: None,
            jwt_expiration_hours: None,
            bcrypt_cost: 10,
            database_path: "accounts.db".to_string(),
            host: "127.0.0.1".parse().unwrap(),
            http_port: 8000,
            https_port: 8443,
            tls_cert_path: None,
            tls_key_path: None,
            cors_origin: None,
            superadmin_email: None,
            superadmin_password: None,
            superadmin_name: "Superadmin".to_string(),
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        ServerArgs::command().debug_assert();
    }

    #[test]
    fn test_development_falls_back_to_dev_key() {
        let config = AppConfig::from_args(isolated_args()).unwrap();

        assert_eq!(config.jwt_secret, DEV_SIGNATURE_KEY);
        assert!(config.jwt_expiration.is_none());
        assert!(config.tls.is_none());
        assert_eq!(config.listen_addr.port(), 8000);
    }

    #[test]
    fn test_production_requires_secret() {
        let mut args = isolated_args();
        args.environment = Environment::Production;
        args.tls_cert_path = Some("cert.pem".into());
        args.tls_key_path = Some("key.pem".into());

        assert!(AppConfig::from_args(args.clone()).is_err());

        args.jwt_secret = Some("prod-secret".to_string());
        let config = AppConfig::from_args(args).unwrap();
        assert_eq!(config.listen_addr.port(), 8443);
        assert!(config.tls.is_some());
    }

    #[test]
    fn test_production_requires_tls_paths() {
        let mut args = isolated_args();
        args.environment = Environment::Production;
        args.jwt_secret = Some("prod-secret".to_string());

        assert!(AppConfig::from_args(args).is_err());
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut empty_secret = isolated_args();
        empty_secret.jwt_secret = Some("  ".to_string());
        assert!(AppConfig::from_args(empty_secret).is_err());

        let mut zero_ttl = isolated_args();
        zero_ttl.jwt_expiration_hours = Some(0);
        assert!(AppConfig::from_args(zero_ttl).is_err());

        let mut bad_cost = isolated_args();
        bad_cost.bcrypt_cost = 2;
        assert!(AppConfig::from_args(bad_cost).is_err());

        let mut half_seed = isolated_args();
        half_seed.superadmin_email = Some("root@example.com".to_string());
        assert!(AppConfig::from_args(half_seed).is_err());

        let mut bad_origin = isolated_args();
        bad_origin.cors_origin = Some("bad\norigin".to_string());
        assert!(AppConfig::from_args(bad_origin).is_err());
    }

    #[test]
    fn test_expiry_and_seed_are_carried() {
        let mut args = isolated_args();
        args.jwt_expiration_hours = Some(24);
        args.superadmin_email = Some("root@example.com".to_string());
        args.superadmin_password = Some("hunter2".to_string());

        let config = AppConfig::from_args(args).unwrap();
        assert_eq!(config.jwt_expiration, Some(chrono::Duration::hours(24)));

        let seed = config.superadmin.unwrap();
        assert_eq!(seed.email, "root@example.com");
        assert!(!format!("{:?}", seed).contains("hunter2"));
    }
}
