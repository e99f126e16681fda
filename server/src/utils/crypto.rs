//! Cryptographic utility functions

use anyhow::{Context, Result};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Generate a cryptographically secure random key
pub fn generate_key(len: usize) -> Vec<u8> {
    let mut key = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut key);
    key
}

/// Generate a 256-bit (32 byte) session signing key
pub fn generate_signing_key() -> Vec<u8> {
    generate_key(32)
}

/// Decode a hex string to bytes
pub fn decode_hex(s: &str) -> Result<Vec<u8>> {
    hex::decode(s).context("Invalid hex string")
}

/// Encode bytes to a lowercase hex string
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Calculate SHA256 hash and return as hex string
pub fn sha256_hex(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_key_length_and_randomness() {
        let a = generate_signing_key();
        let b = generate_signing_key();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hex_helpers() {
        assert_eq!(encode_hex(&[0x01, 0xab]), "01ab");
        assert_eq!(decode_hex("01AB").unwrap(), vec![0x01, 0xab]);
        assert!(decode_hex("abc").is_err());
        assert!(decode_hex("zz").is_err());
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex("hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }
}
