// Authentication module

pub mod middleware;
pub mod token;

use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};

/// Cheapest work factor bcrypt accepts; used by tests to keep hashing fast
pub const LOWEST_COST: u32 = 4;

/// One-way salted password hashing with bcrypt.
///
/// The cost is fixed for the lifetime of the process. Every hash embeds its own
/// random salt, so hashing the same password twice yields different strings
/// that both verify.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    // Hash a password using bcrypt
    pub fn hash(&self, password: &str) -> Result<String> {
        hash(password, self.cost).context("Failed to hash password")
    }

    // Verify a password against a hash. A mismatch is Ok(false); only a corrupt
    // stored hash is an error.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        verify(password, hash).context("Failed to verify password")
    }

    /// Hash on the blocking pool so other requests keep running.
    pub async fn hash_async(&self, password: String) -> Result<String> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .context("Password hashing task failed")?
    }

    pub async fn verify_async(&self, password: String, hash: String) -> Result<bool> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .context("Password verification task failed")?
    }
}
