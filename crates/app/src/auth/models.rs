//! Session models.

use jiff::{SignedDuration, Timestamp};

use crate::domain::users::records::UserUuid;

/// Default access token lifetime.
pub const DEFAULT_ACCESS_TOKEN_TTL: SignedDuration = SignedDuration::from_mins(15);

/// Default refresh token lifetime.
pub const DEFAULT_REFRESH_TOKEN_TTL: SignedDuration = SignedDuration::from_hours(24 * 7);

/// Access and refresh token pair returned to clients.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub access_token_expires_at: Timestamp,
    pub refresh_token: String,
    pub refresh_token_expires_at: Timestamp,
}

/// Signing and lifetime settings for issued tokens.
#[derive(Clone)]
pub struct SessionSettings {
    pub jwt_secret: String,
    pub access_token_ttl: SignedDuration,
    pub refresh_token_ttl: SignedDuration,
}

impl std::fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSettings")
            .field("jwt_secret", &"**redacted**")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish()
    }
}

/// Stored refresh session: one per user.
#[derive(Debug, Clone)]
pub(crate) struct RefreshSession {
    pub user: UserUuid,
    pub expires_at: Timestamp,
}
