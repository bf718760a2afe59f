use crate::error::{AuthError, Result};
use anyhow::anyhow;

/// One-way credential hashing with a per-call random salt. The cost
/// factor comes from configuration so deployments can tune work factor
/// without touching code.
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, plaintext: &str) -> Result<String> {
        bcrypt::hash(plaintext, self.cost)
            .map_err(|err| AuthError::Internal(anyhow!("password hashing failed: {err}")))
    }

    /// Returns `false` on mismatch; only a malformed stored hash is an
    /// error.
    pub fn verify(&self, plaintext: &str, hash: &str) -> Result<bool> {
        bcrypt::verify(plaintext, hash)
            .map_err(|err| AuthError::Internal(anyhow!("malformed password hash: {err}")))
    }
}
