//! Payments Config

use std::time::Duration;

use clap::Args;

use coursemart_app::domain::payments::{
    PaymentSettings,
    stripe::{STRIPE_API_BASE, StripeConfig},
};

/// Payment gateway settings.
#[derive(Debug, Args)]
pub struct PaymentsConfig {
    /// Stripe API address
    #[arg(long, env = "STRIPE_API_BASE", default_value = STRIPE_API_BASE)]
    pub stripe_api_base: String,

    /// Stripe secret key
    #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true, default_value = "")]
    pub stripe_secret_key: String,

    /// ISO currency code charged
    #[arg(long, env = "PAYMENT_CURRENCY", default_value = "usd")]
    pub payment_currency: String,

    /// Upper bound on one gateway round trip, in seconds
    #[arg(long, env = "PAYMENT_GATEWAY_TIMEOUT_SECONDS", default_value_t = 30_u64)]
    pub payment_gateway_timeout_seconds: u64,
}

impl PaymentsConfig {
    #[must_use]
    pub fn stripe(&self) -> StripeConfig {
        StripeConfig {
            api_base: self.stripe_api_base.clone(),
            secret_key: self.stripe_secret_key.clone(),
        }
    }

    #[must_use]
    pub fn payment_settings(&self) -> PaymentSettings {
        PaymentSettings {
            currency: self.payment_currency.clone(),
            gateway_timeout: Duration::from_secs(self.payment_gateway_timeout_seconds),
        }
    }
}
