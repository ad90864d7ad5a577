/// Password hashing and verification using Argon2id
use crate::error::{MemberError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Well-formed PHC string with the default Argon2id parameters that no
/// password hashes to; verified against when the account does not exist.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$GuCKRk6vV35GfFQt6PPFQA$NNP2XtzVXng8wkvQPE3TEZURs1LCzKuBlg2VRNYucIo";

/// Hash a password using Argon2id algorithm
///
/// Returns a PHC-formatted string (random 16-byte salt embedded) that fits
/// the `members.password` column.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| MemberError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against its hash
///
/// Uses the hasher's constant-time comparison. A mismatch is `Ok(false)`;
/// only a corrupt stored hash is an error.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| MemberError::Internal(format!("Invalid password hash format: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(MemberError::Internal(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

/// Spend one full Argon2 verification without a stored hash
///
/// Keeps the unknown-account login path as slow as a wrong password.
pub fn verify_dummy(password: &str) {
    let _ = verify_password(password, DUMMY_HASH);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("pw123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.len() <= 120);

        assert!(verify_password("pw123", &hash).unwrap());
        assert!(!verify_password("pw124", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("pw123").unwrap();
        let second = hash_password("pw123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_corrupt_hash_is_error() {
        assert!(verify_password("pw123", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_dummy_hash_parses_and_never_matches() {
        assert!(!verify_password("pw123", DUMMY_HASH).unwrap());
        assert!(!verify_password("", DUMMY_HASH).unwrap());

        let parsed = PasswordHash::new(DUMMY_HASH).unwrap();
        let fresh_hash = hash_password("pw123").unwrap();
        let fresh = PasswordHash::new(&fresh_hash).unwrap();
        assert_eq!(parsed.algorithm.as_str(), "argon2id");
        assert_eq!(parsed.params.to_string(), fresh.params.to_string());
    }
}
