//! One-way credential hashing

use std::sync::OnceLock;
use thiserror::Error;
use tracing::error;

/// bcrypt work factor for every stored hash. Not configurable per call.
pub const BCRYPT_COST: u32 = 12;

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(#[from] bcrypt::BcryptError);

/// Salted bcrypt hash of `plaintext`; the salt is embedded in the result
pub fn hash_password(plaintext: &str) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(plaintext, BCRYPT_COST)?)
}

/// Constant-time check of `plaintext` against a stored hash.
/// A malformed hash is a mismatch, not an error.
pub fn password_matches(hashed: &str, plaintext: &str) -> bool {
    bcrypt::verify(plaintext, hashed).unwrap_or(false)
}

/// Hash checked when the username does not exist, so an unknown user costs
/// the same as a wrong password
pub fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| {
        hash_password("sentrylink-dummy-password").unwrap_or_else(|e| {
            error!(error = %e, "Failed to hash dummy password, using fixed fallback");
            FALLBACK_DUMMY_HASH.to_string()
        })
    })
}

/// Well-formed cost-12 hash that matches no password anyone will type
const FALLBACK_DUMMY_HASH: &str =
    "$2b$12$Kq3jv0wQy1sTz9XbRcYhGe8mN5pL2dF7aH4kJ6uV0iB3oC9xE1rWy";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_match() {
        let hashed = hash_password("correct horse").expect("hashing should succeed");

        assert_ne!(hashed, "correct horse");
        assert!(hashed.starts_with("$2b$12$"));
        assert!(password_matches(&hashed, "correct horse"));
        assert!(!password_matches(&hashed, "correct horsf"));
        assert!(!password_matches(&hashed, ""));
    }

    #[test]
    fn test_same_input_hashes_differently() {
        let first = hash_password("pw").expect("hashing should succeed");
        let second = hash_password("pw").expect("hashing should succeed");

        assert_ne!(first, second);
        assert!(password_matches(&first, "pw"));
        assert!(password_matches(&second, "pw"));
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!password_matches("", "pw"));
        assert!(!password_matches("not-a-bcrypt-hash", "pw"));
        assert!(!password_matches("$2b$12$truncated", "pw"));
    }

    #[test]
    fn test_fallback_dummy_hash_costs_a_full_verify() {
        assert!(bcrypt::verify("pw", FALLBACK_DUMMY_HASH).is_ok());
        assert!(!password_matches(FALLBACK_DUMMY_HASH, "pw"));
        assert!(!password_matches(FALLBACK_DUMMY_HASH, ""));
    }

    #[test]
    fn test_dummy_hash_is_stable_and_rejects() {
        assert_eq!(dummy_hash(), dummy_hash());
        assert!(!password_matches(dummy_hash(), "pw"));
    }
}
