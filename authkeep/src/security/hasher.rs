//! Password hashing capability and its Argon2id implementation.

use crate::auth::{AuthError, AuthResult};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

/// One-way, salted password hashing.
///
/// `hash` must be non-deterministic (a fresh salt per call). `verify` only
/// answers yes or no: a malformed stored hash and a wrong password are
/// indistinguishable to the caller.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext secret for storage.
    fn hash(&self, secret: &str) -> AuthResult<String>;

    /// Check a plaintext secret against a stored hash.
    fn verify(&self, hash: &str, secret: &str) -> bool;
}

/// Argon2id hasher with a server-side pepper.
#[derive(Clone)]
pub struct Argon2Hasher {
    pepper: String,
    params: Params,
}

impl Argon2Hasher {
    /// Create a hasher with the argon2 crate defaults (m=19456 KiB, t=2, p=1).
    ///
    /// # Arguments
    ///
    /// * `pepper` - Server-side secret appended to every password before hashing
    pub fn new(pepper: String) -> Self {
        Self {
            pepper,
            params: Params::default(),
        }
    }

    /// Create a hasher with custom cost parameters.
    ///
    /// # Errors
    ///
    /// * `AuthError::HashingFailed` - Parameters rejected by argon2
    pub fn with_params(
        pepper: String,
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> AuthResult<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|_| AuthError::HashingFailed)?;
        Ok(Self { pepper, params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    fn peppered(&self, secret: &str) -> String {
        format!("{}{}", secret, self.pepper)
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        Ok(self
            .argon2()
            .hash_password(self.peppered(secret).as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    fn verify(&self, hash: &str, secret: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        // argon2 compares the digests in constant time
        self.argon2()
            .verify_password(self.peppered(secret).as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> Argon2Hasher {
        Argon2Hasher::with_params("test_pepper".to_string(), 8, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash("SecurePass123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(&hash, "SecurePass123"));
        assert!(!hasher.verify(&hash, "SecurePass124"));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = hasher();
        let first = hasher.hash("same").unwrap();
        let second = hasher.hash("same").unwrap();

        assert_ne!(first, second, "Each hash should use a fresh salt");
        assert!(hasher.verify(&first, "same"));
        assert!(hasher.verify(&second, "same"));
    }

    #[test]
    fn test_pepper_is_applied() {
        let hash = hasher().hash("SecurePass123").unwrap();
        let other = Argon2Hasher::with_params("other_pepper".to_string(), 8, 1, 1).unwrap();

        assert!(!other.verify(&hash, "SecurePass123"));
    }

    #[test]
    fn test_malformed_hash_is_rejected() {
        let hasher = hasher();
        assert!(!hasher.verify("not-a-phc-string", "whatever"));
        assert!(!hasher.verify("", ""));
    }

    #[test]
    fn test_invalid_params() {
        let result = Argon2Hasher::with_params("pepper".to_string(), 0, 0, 0);
        assert!(matches!(result, Err(AuthError::HashingFailed)));
    }
}
