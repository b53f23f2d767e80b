//! Password hashing using Argon2id.
//!
//! If a pepper is configured it is prepended to the password before hashing
//! and verification.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

use crate::{EngineError, ResultEngine};

pub const MIN_PASSWORD_LEN: usize = 8;

fn peppered(password: &str, pepper: Option<&str>) -> Vec<u8> {
    match pepper {
        Some(p) => format!("{p}{password}").into_bytes(),
        None => password.as_bytes().to_vec(),
    }
}

/// Hash a plaintext password into a PHC-format string.
pub(crate) fn hash_password(password: &str, pepper: Option<&str>) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(&peppered(password, pepper), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| EngineError::Crypto(format!("hash error: {e}")))
}

/// Returns `Ok(true)` on match, `Ok(false)` on mismatch and an error if the
/// stored hash is malformed.
pub(crate) fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> ResultEngine<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| EngineError::Crypto(format!("invalid hash format: {e}")))?;
    match Argon2::default().verify_password(&peppered(password, pepper), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(EngineError::Crypto(format!("verify error: {e}"))),
    }
}

pub(crate) fn validate_new_password(password: &str, confirm: &str) -> ResultEngine<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(EngineError::invalid(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if password != confirm {
        return Err(EngineError::Conflict("passwords do not match".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_matches() {
        let hash = hash_password("hunter22", None).unwrap();
        assert!(verify_password("hunter22", &hash, None).unwrap());
        assert!(!verify_password("wrong", &hash, None).unwrap());
    }

    #[test]
    fn pepper_is_applied() {
        let hash = hash_password("hunter22", Some("pepper!")).unwrap();
        assert!(verify_password("hunter22", &hash, Some("pepper!")).unwrap());
        assert!(!verify_password("hunter22", &hash, None).unwrap());
    }

    #[test]
    fn malformed_hash_returns_error() {
        assert!(verify_password("pw", "not-a-hash", None).is_err());
    }

    #[test]
    fn new_password_rules() {
        assert!(matches!(
            validate_new_password("short", "short"),
            Err(EngineError::InvalidField { .. })
        ));
        assert!(matches!(
            validate_new_password("longenough", "different"),
            Err(EngineError::Conflict(_))
        ));
        assert!(validate_new_password("longenough", "longenough").is_ok());
    }
}
