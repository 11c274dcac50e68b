//! Payment gateway abstraction.

use std::fmt;

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use zeroize::Zeroize;

/// Raw card details. Zeroed on drop and never printed.
#[derive(Clone)]
pub struct CardDetails {
    pub number: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub cvc: String,
    pub holder_name: String,
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last4 = self
            .number
            .len()
            .checked_sub(4)
            .and_then(|start| self.number.get(start..))
            .unwrap_or("");

        f.debug_struct("CardDetails")
            .field("number", &format_args!("**** {last4}"))
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("cvc", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl Drop for CardDetails {
    fn drop(&mut self) {
        self.number.zeroize();
        self.cvc.zeroize();
    }
}

/// Customer to register with the gateway before charging.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub email: String,
    pub name: String,
    pub card: CardDetails,
}

/// A charge request. `idempotency_key` lets the gateway drop retried requests.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub idempotency_key: String,
    pub customer: String,
    pub amount: u64,
    pub currency: String,
    pub description: String,
}

/// Gateway's answer to a charge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charge {
    pub id: String,
    pub succeeded: bool,
    pub failure_message: Option<String>,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("card declined: {0}")]
    Declined(String),

    #[error("unexpected response from payment gateway: {0}")]
    UnexpectedResponse(String),
}

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Name recorded as the payment's provider.
    fn provider(&self) -> &'static str;

    /// Register a customer and attach their card. Returns the gateway's
    /// customer id.
    async fn create_customer(&self, customer: NewCustomer) -> Result<String, GatewayError>;

    async fn create_charge(&self, charge: ChargeRequest) -> Result<Charge, GatewayError>;
}
