//! Credential rules and password hashing.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AuthError, AuthResult};

static CU_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^CU[0-9]{3,8}$").expect("static regex"));

pub const MIN_PASSWORD_LEN: usize = 5;
pub const MAX_PASSWORD_LEN: usize = 8;

/// A CU staff ID is `CU` followed by 3 to 8 digits, e.g. `CU12345`.
pub fn validate_cu_id(cu_id: &str) -> AuthResult<()> {
    if CU_ID.is_match(cu_id) {
        Ok(())
    } else {
        Err(AuthError::InvalidCuId)
    }
}

/// Passwords are 5-8 characters with at least one uppercase letter, one
/// lowercase letter and one digit.
pub fn validate_password(password: &str) -> AuthResult<()> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(AuthError::InvalidPassword(format!(
            "Password must be {}-{} characters long",
            MIN_PASSWORD_LEN, MAX_PASSWORD_LEN
        )));
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !(has_upper && has_lower && has_digit) {
        return Err(AuthError::InvalidPassword(
            "Password must contain uppercase, lowercase, and numbers".to_string(),
        ));
    }

    Ok(())
}

/// Minimal shape check; delivery is not verified.
pub fn validate_email(email: &str) -> AuthResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AuthError::InvalidEmail(email.to_string()))
    }
}

/// Lowercased, trimmed form used as the lookup key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hash a password with Argon2id and a random salt.
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Check a password against a stored PHC hash string.
pub fn verify_password(password: &str, hash: &str) -> AuthResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cu_id() {
        assert!(validate_cu_id("CU123").is_ok());
        assert!(validate_cu_id("CU12345678").is_ok());
        assert!(validate_cu_id("CU12").is_err());
        assert!(validate_cu_id("CU123456789").is_err());
        assert!(validate_cu_id("cu12345").is_err());
        assert!(validate_cu_id("CU12a45").is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password("Abc12").is_ok());
        assert!(validate_password("Abcdef12").is_ok());

        let err = validate_password("Ab1").unwrap_err();
        assert_eq!(err.to_string(), "Password must be 5-8 characters long");
        assert!(validate_password("Abcdefg12").is_err());
        assert!(validate_password("abc123").is_err());
        assert!(validate_password("ABC123").is_err());
        assert!(validate_password("Abcdef").is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("jane@chreso.edu.zm").is_ok());
        assert!(validate_email("jane@localhost").is_err());
        assert!(validate_email("@chreso.edu").is_err());
        assert!(validate_email("jane doe@chreso.edu").is_err());
        assert_eq!(normalize_email("  Jane@Chreso.EDU "), "jane@chreso.edu");
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Abc12").unwrap();
        assert_ne!(hash, "Abc12");
        assert!(verify_password("Abc12", &hash).unwrap());
        assert!(!verify_password("Abc13", &hash).unwrap());
        assert!(verify_password("Abc12", "not-a-hash").is_err());
    }
}
