use std::sync::OnceLock;

use anyhow::anyhow;
use bcrypt::{hash, verify};

use crate::errors::AppError;

/// Hashes with an explicit bcrypt cost, normally `PasswordConfig::bcrypt_cost`.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost).map_err(|e| AppError::internal(anyhow!("Failed to hash password: {e}")))
}

/// A malformed stored hash counts as a mismatch rather than an error, so a
/// corrupted row cannot be told apart from a wrong password.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match verify(password, hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash could not be verified");
            false
        }
    }
}

/// A hash nobody can log in with, checked when a username is unknown so
/// that lookup misses cost the same bcrypt work as a wrong password.
///
/// Built on first use at the configured cost.
#[derive(Debug)]
pub struct DecoyHash {
    cost: u32,
    hash: OnceLock<Option<String>>,
}

impl DecoyHash {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            hash: OnceLock::new(),
        }
    }

    pub fn hash(&self) -> Option<&str> {
        self.hash
            .get_or_init(|| hash_password_with_cost("embryotech-decoy-credential", self.cost).ok())
            .as_deref()
    }

    /// Whether the hash has been computed yet.
    pub fn is_built(&self) -> bool {
        self.hash.get().is_some()
    }

    /// Runs a full verification and always reports a mismatch.
    pub fn verify(&self, password: &str) -> bool {
        if let Some(hash) = self.hash() {
            let _ = verify_password(password, hash);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_is_salted() {
        let first = hash_password_with_cost("incubadora", TEST_COST).unwrap();
        let second = hash_password_with_cost("incubadora", TEST_COST).unwrap();
        assert_ne!(first, second);
        assert_ne!(first, "incubadora");
    }

    #[test]
    fn test_verify_password_correct() {
        let hash = hash_password_with_cost("correctpassword", TEST_COST).unwrap();
        assert!(verify_password("correctpassword", &hash));
    }

    #[test]
    fn test_verify_password_incorrect() {
        let hash = hash_password_with_cost("correctpassword", TEST_COST).unwrap();
        assert!(!verify_password("wrongpassword", &hash));
    }

    #[test]
    fn test_verify_password_garbage_hash() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }

    #[test]
    fn test_invalid_cost_is_internal_error() {
        let err = hash_password_with_cost("pw", 99).unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::Internal);
    }

    #[test]
    fn test_decoy_uses_configured_cost() {
        let decoy = DecoyHash::new(TEST_COST);
        assert!(decoy.hash().unwrap().starts_with("$2b$04$"));
    }

    #[test]
    fn test_decoy_never_matches() {
        let decoy = DecoyHash::new(TEST_COST);
        assert!(!decoy.verify("embryotech-decoy-credential"));
        assert!(!decoy.verify(""));
    }
}
