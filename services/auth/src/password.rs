//! Password hashing with Argon2id
//!
//! Hashes are PHC strings, so the parameters used at hash time travel with
//! the hash and verification keeps working after the cost is raised.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
    password_hash::SaltString,
};
use serde::Deserialize;
use tracing::{error, warn};

use crate::error::{AuthError, AuthResult};

/// Argon2 cost parameters
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordConfig {
    /// Number of passes over memory
    pub time_cost: u32,
    /// Memory size in KiB
    pub memory_cost_kib: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            time_cost: Params::DEFAULT_T_COST,
            memory_cost_kib: Params::DEFAULT_M_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// One-way password transform with a matching verifier
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Hash of a random secret, verified against when no account matches
    dummy_hash: String,
}

impl PasswordHasher {
    /// Create a hasher, rejecting parameters Argon2 cannot use
    pub fn new(config: &PasswordConfig) -> AuthResult<Self> {
        let params = Params::new(
            config.memory_cost_kib,
            config.time_cost,
            config.parallelism,
            None,
        )
        .map_err(|e| AuthError::Internal(format!("Invalid Argon2 parameters: {}", e)))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut rng = rand::thread_rng();
        let secret = SaltString::generate(&mut rng);
        let salt = SaltString::generate(&mut rng);
        let dummy_hash = argon2
            .hash_password(secret.as_str().as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(format!("Failed to hash password: {}", e)))?
            .to_string();

        Ok(Self { argon2, dummy_hash })
    }

    /// Hash a password. Runs on the blocking pool.
    pub async fn hash(&self, plaintext: &str) -> AuthResult<String> {
        let argon2 = self.argon2.clone();
        let plaintext = plaintext.to_owned();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut rand::thread_rng());
            argon2
                .hash_password(plaintext.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AuthError::Internal(format!("Failed to hash password: {}", e)))
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    /// Check a password against a stored hash.
    ///
    /// A stored hash that does not parse verifies as `false`.
    pub async fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        let argon2 = self.argon2.clone();
        let plaintext = plaintext.to_owned();
        let stored_hash = stored_hash.to_owned();

        let outcome = tokio::task::spawn_blocking(move || {
            let parsed = match PasswordHash::new(&stored_hash) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Stored password hash is malformed: {}", e);
                    return false;
                }
            };
            argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok()
        })
        .await;

        outcome.unwrap_or_else(|e| {
            error!("Password verification task failed: {}", e);
            false
        })
    }

    /// Spend the cost of one verification without a real account.
    ///
    /// Always `false`; keeps a missing account as slow as a wrong password.
    pub async fn verify_dummy(&self, plaintext: &str) -> bool {
        self.verify(plaintext, &self.dummy_hash).await;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::new(&PasswordConfig {
            time_cost: 1,
            memory_cost_kib: 256,
            parallelism: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hasher = fast_hasher();
        let hash = hasher.hash("secret1").await.unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("secret1"));
        assert!(hasher.verify("secret1", &hash).await);
        assert!(!hasher.verify("secret2", &hash).await);
        assert!(!hasher.verify("Secret1", &hash).await);
    }

    #[tokio::test]
    async fn test_same_password_hashes_differently() {
        let hasher = fast_hasher();
        let first = hasher.hash("secret1").await.unwrap();
        let second = hasher.hash("secret1").await.unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("secret1", &second).await);
    }

    #[tokio::test]
    async fn test_malformed_hash_verifies_false() {
        let hasher = fast_hasher();
        assert!(!hasher.verify("secret1", "").await);
        assert!(!hasher.verify("secret1", "not-a-phc-string").await);
        assert!(!hasher.verify("secret1", "$2b$12$abcdefghijklmnopqrstuv").await);
    }

    #[tokio::test]
    async fn test_verify_uses_parameters_from_hash() {
        let stronger = PasswordHasher::new(&PasswordConfig {
            time_cost: 2,
            memory_cost_kib: 512,
            parallelism: 1,
        })
        .unwrap();
        let hash = stronger.hash("secret1").await.unwrap();

        assert!(fast_hasher().verify("secret1", &hash).await);
    }

    #[tokio::test]
    async fn test_dummy_hash_costs_as_much_as_a_real_one() {
        let hasher = fast_hasher();
        let real = hasher.hash("secret1").await.unwrap();

        let dummy = PasswordHash::new(&hasher.dummy_hash).unwrap();
        let real = PasswordHash::new(&real).unwrap();
        assert_eq!(dummy.algorithm, real.algorithm);
        assert_eq!(dummy.params, real.params);

        assert!(!hasher.verify_dummy("secret1").await);
        assert!(!hasher.verify_dummy("").await);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let result = PasswordHasher::new(&PasswordConfig {
            time_cost: 0,
            memory_cost_kib: 256,
            parallelism: 1,
        });
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }
}
