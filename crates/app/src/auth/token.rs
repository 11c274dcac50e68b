//! Refresh token formatting, parsing and hashing.
//!
//! Format: `cm_rt_<64 hex chars>`. Only the SHA-256 digest of the secret is
//! stored, so a leaked database row cannot be replayed as a token.

use std::fmt;

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroize;

/// Refresh token prefix.
pub const REFRESH_TOKEN_PREFIX: &str = "cm_rt_";

/// Number of secret bytes encoded in a token.
pub const REFRESH_TOKEN_SECRET_BYTES: usize = 32;

const REFRESH_TOKEN_SECRET_HEX_CHARS: usize = REFRESH_TOKEN_SECRET_BYTES * 2;

#[derive(Clone)]
pub struct RefreshTokenSecret {
    bytes: [u8; REFRESH_TOKEN_SECRET_BYTES],
}

impl RefreshTokenSecret {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; REFRESH_TOKEN_SECRET_BYTES]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; REFRESH_TOKEN_SECRET_BYTES] {
        &self.bytes
    }

    /// The client-facing token string.
    #[must_use]
    pub fn format(&self) -> String {
        format!("{REFRESH_TOKEN_PREFIX}{}", hex::encode(self.bytes))
    }

    /// Hex SHA-256 digest stored in place of the token.
    #[must_use]
    pub fn hash(&self) -> String {
        hex::encode(Sha256::digest(self.bytes))
    }
}

impl fmt::Debug for RefreshTokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshTokenSecret(**redacted**)")
    }
}

impl Drop for RefreshTokenSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

#[derive(Debug, Error)]
pub enum RefreshTokenError {
    #[error("refresh token format is invalid")]
    InvalidFormat,

    #[error("refresh token secret encoding is invalid")]
    InvalidSecretEncoding,
}

#[must_use]
pub fn generate_refresh_token() -> RefreshTokenSecret {
    let mut secret = [0_u8; REFRESH_TOKEN_SECRET_BYTES];

    OsRng.fill_bytes(&mut secret);

    RefreshTokenSecret::from_bytes(secret)
}

/// Parse a client-supplied refresh token.
///
/// # Errors
///
/// Returns an error when the prefix or secret encoding is wrong.
pub fn parse_refresh_token(token: &str) -> Result<RefreshTokenSecret, RefreshTokenError> {
    let secret_hex = token
        .strip_prefix(REFRESH_TOKEN_PREFIX)
        .ok_or(RefreshTokenError::InvalidFormat)?;

    if secret_hex.len() != REFRESH_TOKEN_SECRET_HEX_CHARS {
        return Err(RefreshTokenError::InvalidFormat);
    }

    let mut secret = [0_u8; REFRESH_TOKEN_SECRET_BYTES];

    hex::decode_to_slice(secret_hex, &mut secret)
        .map_err(|_| RefreshTokenError::InvalidSecretEncoding)?;

    Ok(RefreshTokenSecret::from_bytes(secret))
}
