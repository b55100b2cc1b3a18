use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use domains::CredentialHasher;
use sha2::{Digest, Sha256};

/// Credential given to accounts created implicitly by a first post.
/// Nothing logs in with it yet.
const PLACEHOLDER_ACCOUNT_PASSWORD: &str = "dummy_initial_password";

/// Post passwords become a plain SHA-256 hex digest so the same password
/// always renders the same 7-character segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256CredentialHasher;

impl CredentialHasher for Sha256CredentialHasher {
    fn post_password_hash(&self, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn placeholder_account_hash(&self) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(PLACEHOLDER_ACCOUNT_PASSWORD.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("argon2 hashing failed: {e}"))?;
        Ok(hash.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHash, PasswordVerifier};

    #[test]
    fn post_hash_is_hex_sha256() {
        let hasher = Sha256CredentialHasher;
        assert!(hasher.post_password_hash("secret").starts_with("2bb80d5"));
        assert!(hasher.post_password_hash("").starts_with("e3b0c44"));
        assert_eq!(hasher.post_password_hash("x").len(), 64);
    }

    #[test]
    fn placeholder_hash_verifies_and_is_salted() {
        let hasher = Sha256CredentialHasher;
        let first = tokio_test::assert_ok!(hasher.placeholder_account_hash());
        let second = tokio_test::assert_ok!(hasher.placeholder_account_hash());
        assert_ne!(first, second);

        let parsed = PasswordHash::new(&first).unwrap();
        assert!(Argon2::default()
            .verify_password(PLACEHOLDER_ACCOUNT_PASSWORD.as_bytes(), &parsed)
            .is_ok());
    }
}
