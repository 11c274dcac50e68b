//! Auth Config

use clap::Args;
use jiff::SignedDuration;

use coursemart_app::auth::SessionSettings;

/// Token signing and lifetime settings.
#[derive(Debug, Args)]
pub struct AuthConfig {
    /// Shared secret for signing access tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    #[arg(long, env = "ACCESS_TOKEN_TTL_SECONDS", default_value_t = 900_u32)]
    pub access_token_ttl_seconds: u32,

    /// Refresh token lifetime in seconds
    #[arg(long, env = "REFRESH_TOKEN_TTL_SECONDS", default_value_t = 604_800_u32)]
    pub refresh_token_ttl_seconds: u32,
}

impl AuthConfig {
    #[must_use]
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            jwt_secret: self.jwt_secret.clone(),
            access_token_ttl: SignedDuration::from_secs(i64::from(self.access_token_ttl_seconds)),
            refresh_token_ttl: SignedDuration::from_secs(i64::from(
                self.refresh_token_ttl_seconds,
            )),
        }
    }
}
