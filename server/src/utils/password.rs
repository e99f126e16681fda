//! Password hashing
//!
//! PBKDF2-HMAC-SHA256 stored as a PHC string
//! (`$pbkdf2-sha256$i=<rounds>,l=32$<salt>$<hash>`).

use pbkdf2::password_hash::{
    Error as PhcError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use pbkdf2::{Algorithm, Params, Pbkdf2};
use thiserror::Error;

use super::crypto::generate_key;
use crate::core::constants::PASSWORD_HASH_ITERATIONS;

const SALT_LEN: usize = 16;
const OUTPUT_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Malformed password hash")]
    Malformed,
    #[error("Iteration count must be positive")]
    ZeroIterations,
}

impl From<PhcError> for PasswordError {
    fn from(_: PhcError) -> Self {
        Self::Malformed
    }
}

/// Hash with an explicit iteration count
pub fn hash_password_with(password: &str, iterations: u32) -> Result<String, PasswordError> {
    if iterations == 0 {
        return Err(PasswordError::ZeroIterations);
    }
    let salt = SaltString::encode_b64(&generate_key(SALT_LEN))?;
    let params = Params {
        rounds: iterations,
        output_length: OUTPUT_LEN,
    };
    let hash = Pbkdf2.hash_password_customized(
        password.as_bytes(),
        Some(Algorithm::Pbkdf2Sha256.ident()),
        None,
        params,
        &salt,
    )?;
    Ok(hash.to_string())
}

/// Hash a password for storage
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_password_with(password, PASSWORD_HASH_ITERATIONS)
}

/// Verify a password against a stored hash
///
/// `Ok(false)` is a wrong password; `Err` means the stored hash is unusable.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored)?;
    if parsed.algorithm != Algorithm::Pbkdf2Sha256.ident() {
        return Err(PasswordError::Malformed);
    }
    if parsed.params.get_decimal("i") == Some(0) {
        return Err(PasswordError::ZeroIterations);
    }

    match Pbkdf2.verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PhcError::Password) => Ok(false),
        Err(_) => Err(PasswordError::Malformed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let stored = hash_password_with("correct horse", 10).unwrap();
        assert!(stored.starts_with("$pbkdf2-sha256$i=10,l=32$"));
        assert!(verify_password("correct horse", &stored).unwrap());
        assert!(!verify_password("wrong horse", &stored).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password_with("same", 5).unwrap();
        let b = hash_password_with("same", 5).unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same", &a).unwrap());
        assert!(verify_password("same", &b).unwrap());
    }

    #[test]
    fn test_default_rounds() {
        let stored = hash_password("correct horse").unwrap();
        let parsed = PasswordHash::new(&stored).unwrap();
        assert_eq!(
            parsed.params.get_decimal("i"),
            Some(PASSWORD_HASH_ITERATIONS)
        );
    }

    #[test]
    fn test_malformed_hash() {
        assert_eq!(
            verify_password("x", "plaintext"),
            Err(PasswordError::Malformed)
        );
        assert_eq!(
            verify_password("x", "pbkdf2-sha256$10$00$00"),
            Err(PasswordError::Malformed)
        );
        assert_eq!(hash_password_with("x", 0), Err(PasswordError::ZeroIterations));
    }
}
