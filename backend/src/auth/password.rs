//! Password hashing and verification via bcrypt.

/// Default bcrypt cost factor.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// bcrypt only reads this many bytes of a password. Anything past it is
/// silently ignored by both [`hash_password`] and [`verify_password`], so two
/// passwords sharing a 72-byte prefix verify against the same hash.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a password with bcrypt at the given cost.
///
/// Input longer than [`MAX_PASSWORD_BYTES`] is truncated; callers that
/// accept new passwords should reject it first.
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

/// Check a password against a stored bcrypt hash.
///
/// A hash that cannot be parsed or compared counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Password comparison failed, treating as mismatch: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // bcrypt's minimum cost keeps these tests fast.
    const COST: u32 = 4;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("password", COST).unwrap();
        assert!(verify_password("password", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("password", COST).unwrap();
        let second = hash_password("password", COST).unwrap();
        assert_ne!(first, second);
        assert!(verify_password("password", &first));
        assert!(verify_password("password", &second));
    }

    #[test]
    fn test_hash_never_contains_plaintext() {
        let hash = hash_password("correct horse battery staple", COST).unwrap();
        assert!(!hash.contains("correct horse"));
    }

    #[test]
    fn test_malformed_hash_fails_closed() {
        assert!(!verify_password("password", ""));
        assert!(!verify_password("password", "not-a-bcrypt-hash"));
        assert!(!verify_password("password", "$2b$10$truncated"));
    }

    #[test]
    fn test_invalid_cost_is_rejected() {
        assert!(hash_password("password", 2).is_err());
    }

    #[test]
    fn test_bytes_past_limit_are_ignored() {
        let prefix = "a".repeat(MAX_PASSWORD_BYTES);
        let hash = hash_password(&format!("{}first", prefix), COST).unwrap();
        assert!(verify_password(&format!("{}second", prefix), &hash));
    }
}
