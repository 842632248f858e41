//! Password hashing with Argon2id

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};

use crate::error::{AuthError, AuthResult};

/// Hashes and verifies user passwords
///
/// Hashes are stored as PHC strings, so a hash produced with one parameter set
/// still verifies after the parameters change.
#[derive(Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl Default for PasswordService {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl PasswordService {
    /// Build a service with explicit Argon2id cost parameters
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> AuthResult<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AuthError::Configuration(format!("Invalid Argon2 parameters: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password with a fresh random salt
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(format!("Failed to hash password: {}", e)))?;

        Ok(hash.to_string())
    }

    /// Check a plaintext password against a stored hash
    pub fn verify(&self, password: &str, password_hash: &str) -> AuthResult<bool> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|e| AuthError::Hashing(format!("Failed to parse password hash: {}", e)))?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> PasswordService {
        PasswordService::with_params(1024, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_then_verify() {
        let service = service();
        let hash = service.hash("Sup3r$ecret").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(service.verify("Sup3r$ecret", &hash).unwrap());
        assert!(!service.verify("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let service = service();
        let first = service.hash("Sup3r$ecret").unwrap();
        let second = service.hash("Sup3r$ecret").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_hash_from_other_params_still_verifies() {
        let hash = service().hash("Sup3r$ecret").unwrap();
        let stronger = PasswordService::with_params(2048, 2, 1).unwrap();

        assert!(stronger.verify("Sup3r$ecret", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            service().verify("anything", "not-a-phc-string"),
            Err(AuthError::Hashing(_))
        ));
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        assert!(PasswordService::with_params(0, 0, 0).is_err());
    }
}
