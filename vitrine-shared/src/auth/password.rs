//! Password hashing using Argon2id
//!
//! Hashes are stored in PHC string format, so the parameters travel with the
//! hash and verification does not need to know them.
//!
//! # Example
//!
//! ```
//! use vitrine_shared::auth::password::{hash_password, verify_password};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("Curso2024")?;
//! assert!(verify_password("Curso2024", &hash)?);
//! assert!(!verify_password("outra", &hash)?);
//! # Ok(())
//! # }
//! ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Hashes a password with Argon2id (19 MiB, 2 passes, 1 lane)
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(19_456)
        .t_cost(2)
        .p_cost(1)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))
}

/// Verifies a password against a PHC hash in constant time
///
/// Returns `Ok(false)` for a wrong password and an error only for a
/// malformed hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Checks the minimum password policy
///
/// At least 8 characters with at least one letter and one digit. The error
/// is a user-facing message.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < 8 {
        return Err("A senha deve ter pelo menos 8 caracteres".to_string());
    }

    if !password.chars().any(|c| c.is_alphabetic()) {
        return Err("A senha deve conter pelo menos uma letra".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("A senha deve conter pelo menos um número".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_is_argon2id() {
        let hash = hash_password("segredo123").expect("Hash should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = hash_password("segredo123").unwrap();
        let b = hash_password("segredo123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("segredo123").unwrap();
        assert!(verify_password("segredo123", &hash).unwrap());
        assert!(!verify_password("segredo124", &hash).unwrap());
    }

    #[test]
    fn test_verify_with_malformed_hash() {
        assert!(matches!(
            verify_password("x", "not-a-hash"),
            Err(PasswordError::InvalidHash(_))
        ));
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("abcdef12").is_ok());
        assert!(validate_password_strength("ab12").is_err());
        assert!(validate_password_strength("abcdefgh").is_err());
        assert!(validate_password_strength("12345678").is_err());
    }
}
