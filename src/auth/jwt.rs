//! JWT Token Handler
//! Mission: Issue and verify stateless bearer tokens

use crate::auth::models::{Claims, User};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;
use tracing::debug;

/// JWT Handler for token operations
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration: Option<Duration>,
}

impl JwtHandler {
    /// Create a handler that issues tokens without an `exp` claim
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration: None,
        }
    }

    /// Issue tokens that expire after `expiration`
    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn expiration(&self) -> Option<Duration> {
        self.expiration
    }

    /// Generate a JWT token for a user
    pub fn generate_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let exp = match self.expiration {
            Some(ttl) => Some(
                now.checked_add_signed(ttl)
                    .context("Invalid timestamp")?
                    .timestamp(),
            ),
            None => None,
        };

        let claims = Claims {
            id: user.id,
            email: user.email.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
            iat: now.timestamp(),
            exp,
        };

        debug!("Generating JWT for user {} (expires: {:?})", user.id, exp);

        self.sign(&claims)
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String> {
        encode(&Header::default(), claims, &self.encoding_key).context("Failed to generate JWT")
    }

    /// Validate a JWT token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        let decoded =
            decode::<Claims>(token, &self.decoding_key, &self.validation()).map_err(|e| {
                debug!("JWT rejected: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid,
                }
            })?;

        Ok(decoded.claims)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::default();
        validation.leeway = 0;
        if self.expiration.is_none() {
            validation.required_spec_claims.clear();
            validation.validate_exp = false;
        }
        validation
    }
}

/// Token verification failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Invalid,
    Expired,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Invalid => write!(f, "Invalid token"),
            TokenError::Expired => write!(f, "Token expired"),
        }
    }
}

impl std::error::Error for TokenError {}
