//! Password hashing.
//!
//! Stored format: `scrypt$<hex salt>$<hex key>`.

use rand::{RngCore, rngs::OsRng};
use scrypt::{Params, scrypt};
use thiserror::Error;

const SCHEME: &str = "scrypt";
const SALT_BYTES: usize = 16;
const KEY_BYTES: usize = 32;

// N = 2^14, r = 8, p = 1
const LOG_N: u8 = 14;
const R: u32 = 8;
const P: u32 = 1;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hash has an unrecognised format")]
    InvalidFormat,

    #[error("scrypt parameters rejected: {0}")]
    Params(#[from] scrypt::errors::InvalidParams),

    #[error("scrypt output length rejected: {0}")]
    OutputLength(#[from] scrypt::errors::InvalidOutputLen),
}

/// Hash a password with a fresh random salt.
///
/// # Errors
///
/// Returns an error if key derivation fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut salt = [0_u8; SALT_BYTES];

    OsRng.fill_bytes(&mut salt);

    let key = derive_key(password, &salt)?;

    Ok(format!("{SCHEME}${}${}", hex::encode(salt), hex::encode(key)))
}

/// Check a password against a hash produced by [`hash_password`].
///
/// # Errors
///
/// Returns an error if the stored hash is malformed or derivation fails.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let mut parts = stored.splitn(3, '$');

    let scheme = parts.next().ok_or(PasswordError::InvalidFormat)?;
    let salt_hex = parts.next().ok_or(PasswordError::InvalidFormat)?;
    let key_hex = parts.next().ok_or(PasswordError::InvalidFormat)?;

    if scheme != SCHEME {
        return Err(PasswordError::InvalidFormat);
    }

    let salt = hex::decode(salt_hex).map_err(|_ignored| PasswordError::InvalidFormat)?;
    let expected = hex::decode(key_hex).map_err(|_ignored| PasswordError::InvalidFormat)?;

    let derived = derive_key(password, &salt)?;

    Ok(constant_time_eq(&derived, &expected))
}

fn derive_key(password: &str, salt: &[u8]) -> Result<[u8; KEY_BYTES], PasswordError> {
    let params = Params::new(LOG_N, R, P, KEY_BYTES)?;
    let mut key = [0_u8; KEY_BYTES];

    scrypt(password.as_bytes(), salt, &params, &mut key)?;

    Ok(key)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0_u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
