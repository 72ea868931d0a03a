//! Customer password handling.
//!
//! New passwords are stored as Argon2id PHC strings. Accounts created by the
//! first storefront release carry a reversible `qxpw_` encoding instead; those
//! can still be verified here and are rehashed by the caller after a
//! successful sign-in.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{distributions::Alphanumeric, Rng};
use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

/// Argon2id parameters following OWASP recommendations (2024).
/// - Memory: 19456 KiB (19 MiB)
/// - Iterations: 2
/// - Parallelism: 1
const MEMORY_COST: u32 = 19456;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

/// Prefix of the legacy reversible encoding.
pub const LEGACY_PREFIX: &str = "qxpw_";

/// Length of generated temporary passwords.
pub const TEMPORARY_PASSWORD_LEN: usize = 12;

fn create_argon2() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::HashError(format!("Failed to create Argon2 params: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password using Argon2id.
///
/// Surrounding whitespace is stripped first, matching how the storefront has
/// always treated passwords typed into its forms.
///
/// # Example
/// ```
/// use shared::password::hash_password;
///
/// let hash = hash_password("my_secure_password").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = create_argon2()?;

    argon2
        .hash_password(password.trim().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a password against a stored Argon2 hash.
///
/// # Example
/// ```
/// use shared::password::{hash_password, verify_password};
///
/// let hash = hash_password("my_password").unwrap();
/// assert!(verify_password("my_password", &hash).unwrap());
/// assert!(!verify_password("wrong_password", &hash).unwrap());
/// ```
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    // The PHC string carries its own parameters.
    let argon2 = Argon2::default();

    match argon2.verify_password(password.trim().as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Returns true if the stored value uses the legacy `qxpw_` encoding.
pub fn is_legacy_hash(stored: &str) -> bool {
    stored.starts_with(LEGACY_PREFIX)
}

/// Checks a password against a legacy `qxpw_` + base64 value.
pub fn verify_legacy(password: &str, stored: &str) -> bool {
    match stored.strip_prefix(LEGACY_PREFIX) {
        Some(encoded) => STANDARD.encode(password.trim()) == encoded,
        None => false,
    }
}

/// Verifies a password against whichever format is stored.
///
/// Returns `(matches, needs_rehash)`.
pub fn verify_any(password: &str, stored: &str) -> Result<(bool, bool), PasswordError> {
    if is_legacy_hash(stored) {
        let ok = verify_legacy(password, stored);
        return Ok((ok, ok));
    }
    verify_password(password, stored).map(|ok| (ok, false))
}

/// Generates a random alphanumeric password for admin-created accounts.
pub fn generate_temporary_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TEMPORARY_PASSWORD_LEN)
        .map(char::from)
        .collect()
}
