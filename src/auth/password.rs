//! Password Hashing
//! Mission: One-way salted bcrypt hashing with a configured cost

use anyhow::{Context, Result};
use bcrypt::{hash, verify};

/// Bcrypt hasher bound to a fixed work factor
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String> {
        hash(password, self.cost).context("Failed to hash password")
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// A mismatch is `Ok(false)`; an unreadable hash is an error.
    pub fn verify(&self, password: &str, hashed: &str) -> Result<bool> {
        verify(password, hashed).context("Failed to verify password")
    }

    /// `hash` on the blocking pool, for use from request handlers
    pub async fn hash_blocking(&self, password: String) -> Result<String> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .context("Password hashing task failed")?
    }

    /// `verify` on the blocking pool, for use from request handlers
    pub async fn verify_blocking(&self, password: String, hashed: String) -> Result<bool> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hashed))
            .await
            .context("Password verification task failed")?
    }
}
