use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::RngCore;

/// Length of a token key in hex characters
pub const TOKEN_LENGTH: usize = 40;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hash(String),
    #[error("Invalid password hash: {0}")]
    InvalidHash(String),
}

/// Mint a new opaque token key: 20 bytes from the OS RNG, hex encoded.
pub fn generate_token_key() -> String {
    let mut bytes = [0u8; TOKEN_LENGTH / 2];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a password using Argon2id. Returns a PHC-format string.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a PHC-format hash string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_keys_are_forty_lowercase_hex_chars() {
        let key = generate_token_key();
        assert_eq!(key.len(), TOKEN_LENGTH);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn token_keys_do_not_repeat() {
        assert_ne!(generate_token_key(), generate_token_key());
    }

    #[test]
    fn password_round_trip() {
        let hash = hash_password("john").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("john", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("john", "plaintext"),
            Err(PasswordError::InvalidHash(_))
        ));
    }
}
