//! Session Models

use std::fmt;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

use coursemart_app::auth::TokenPair;

/// Credentials for a password login.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// A refresh token presented for rotation or revocation.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshTokenRequest {
    pub refresh_token: String,
}

impl fmt::Debug for RefreshTokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenRequest").finish_non_exhaustive()
    }
}

/// Token pair response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenPairResponse {
    /// Signed access token to send as `Authorization: Bearer`
    pub access_token: String,

    /// When the access token stops being accepted
    pub access_expiry: String,

    /// Opaque single-use refresh token
    pub refresh_token: String,

    /// When the refresh token expires
    pub refresh_expiry: String,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        TokenPairResponse {
            access_token: pair.access_token,
            access_expiry: pair.access_token_expires_at.to_string(),
            refresh_token: pair.refresh_token,
            refresh_expiry: pair.refresh_token_expires_at.to_string(),
        }
    }
}
