//! Stripe client for customer registration and card charges.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use crate::domain::payments::gateway::{
    Charge, ChargeRequest, GatewayError, NewCustomer, PaymentGateway,
};

/// Provider name recorded on payments charged through Stripe.
pub const STRIPE_PROVIDER: &str = "stripe";

/// Default Stripe API address.
pub const STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Configuration for connecting to Stripe.
#[derive(Clone)]
pub struct StripeConfig {
    /// API address, e.g. `"https://api.stripe.com"`.
    pub api_base: String,

    /// Secret API key (`sk_...`).
    pub secret_key: String,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_base", &self.api_base)
            .field("secret_key", &"**redacted**")
            .finish()
    }
}

/// HTTP client for the Stripe tokens, customers and charges endpoints.
#[derive(Debug, Clone)]
pub struct StripeGateway {
    config: StripeConfig,
    http: Client,
}

impl StripeGateway {
    #[must_use]
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.config.api_base.trim_end_matches('/'));

        self.http.post(url).bearer_auth(&self.config.secret_key)
    }

    async fn create_card_token(&self, customer: &NewCustomer) -> Result<String, GatewayError> {
        let card = &customer.card;

        let form = [
            ("card[number]", card.number.clone()),
            ("card[exp_month]", card.exp_month.to_string()),
            ("card[exp_year]", card.exp_year.to_string()),
            ("card[cvc]", card.cvc.clone()),
            ("card[name]", card.holder_name.clone()),
        ];

        let response = self.post("/v1/tokens").form(&form).send().await?;

        let token: IdResponse = parse_response(response, "token").await?;

        Ok(token.id)
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    fn provider(&self) -> &'static str {
        STRIPE_PROVIDER
    }

    async fn create_customer(&self, customer: NewCustomer) -> Result<String, GatewayError> {
        let source = self.create_card_token(&customer).await?;

        let form = [
            ("email", customer.email.clone()),
            ("name", customer.name.clone()),
            ("source", source),
        ];

        let response = self.post("/v1/customers").form(&form).send().await?;

        let created: IdResponse = parse_response(response, "customer").await?;

        Ok(created.id)
    }

    async fn create_charge(&self, charge: ChargeRequest) -> Result<Charge, GatewayError> {
        let form = [
            ("amount", charge.amount.to_string()),
            ("currency", charge.currency.clone()),
            ("customer", charge.customer.clone()),
            ("description", charge.description.clone()),
        ];

        let response = self
            .post("/v1/charges")
            .header("Idempotency-Key", &charge.idempotency_key)
            .form(&form)
            .send()
            .await?;

        let created: ChargeResponse = parse_response(response, "charge").await?;

        Ok(Charge {
            succeeded: created.paid && created.status == "succeeded",
            id: created.id,
            failure_message: created.failure_message,
        })
    }
}

/// Decode a 2xx body; card errors (402) become [`GatewayError::Declined`].
async fn parse_response<T>(response: Response, what: &str) -> Result<T, GatewayError>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();

    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();

    if status == StatusCode::PAYMENT_REQUIRED {
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .ok()
            .and_then(|body| body.error.message)
            .unwrap_or_else(|| "card declined".to_string());

        return Err(GatewayError::Declined(message));
    }

    Err(GatewayError::UnexpectedResponse(format!(
        "{what} request failed with status {status}: {text}"
    )))
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ChargeResponse {
    id: String,
    status: String,
    #[serde(default)]
    paid: bool,
    #[serde(default)]
    failure_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}
