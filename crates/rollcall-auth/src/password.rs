//! Password hashing and verification using Argon2id, plus generation of
//! temporary first-access passwords.

use std::sync::LazyLock;

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::AuthError;

fn peppered_input<'a>(password: &'a str, pepper: Option<&str>, buf: &'a mut String) -> &'a [u8] {
    match pepper {
        Some(p) => {
            *buf = format!("{p}{password}");
            buf.as_bytes()
        }
        None => password.as_bytes(),
    }
}

/// Hash a password with Argon2id using OWASP-recommended parameters
/// (memory: 19 MiB, iterations: 2, parallelism: 1).
///
/// A fresh random salt is embedded in every PHC string, so hashing the
/// same password twice yields different outputs. If a pepper is
/// provided, it is prepended to the password before hashing.
pub fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, AuthError> {
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| AuthError::Crypto(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut buf = String::new();
    let input = peppered_input(password, pepper, &mut buf);

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| AuthError::Crypto(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a plaintext password against an Argon2id PHC-format hash.
///
/// The pepper must match the one used during hashing.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
/// `Err(AuthError::Crypto)` if the stored hash is malformed.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let mut buf = String::new();
    let input = peppered_input(password, pepper, &mut buf);

    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(input, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}

/// Whether `value` is a complete Argon2 PHC string: algorithm, salt and
/// hash output all present.
///
/// Write paths use this to refuse re-hashing a stored hash.
pub fn is_password_hash(value: &str) -> bool {
    if !value.starts_with("$argon2") {
        return false;
    }
    match argon2::PasswordHash::new(value) {
        Ok(parsed) => parsed.salt.is_some() && parsed.hash.is_some(),
        Err(_) => false,
    }
}

/// Verify against a fixed throwaway hash so a lookup miss costs the same
/// Argon2 work as a wrong password.
pub fn burn_verification(password: &str, pepper: Option<&str>) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash, pepper);
    }
}

static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("rollcall-dummy-password", None).ok());

/// Generate a random temporary password: `num_bytes` bytes from the
/// thread RNG, hex-encoded (two characters per byte).
pub fn generate_temporary_password(num_bytes: usize) -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..num_bytes.max(1))
        .map(|_| rand::Rng::random::<u8>(&mut rng))
        .collect();
    hex::encode(bytes)
}
