//! Password hashing via bcrypt.
//!
//! bcrypt verification is constant-time at the primitive level, so the
//! login path does not leak timing information about stored hashes.

use tracing::error;

use crate::error::{Error, Result};

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a raw password for storage.
pub fn hash(password: &str) -> Result<String> {
    bcrypt::hash(password, BCRYPT_COST).map_err(|err| {
        error!("bcrypt hash failed: {err}");
        Error::Internal("password hashing failed".to_string())
    })
}

/// Verify a raw password against a stored bcrypt hash.
pub fn verify(password: &str, password_hash: &str) -> Result<bool> {
    bcrypt::verify(password, password_hash).map_err(|err| {
        error!("bcrypt verify failed: {err}");
        Error::Internal("password verification failed".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hashed = hash("correct horse battery staple").unwrap();
        assert!(verify("correct horse battery staple", &hashed).unwrap());
        assert!(!verify("wrong password", &hashed).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash("same input").unwrap();
        let second = hash("same input").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(verify("anything", "not-a-bcrypt-hash").is_err());
    }
}
