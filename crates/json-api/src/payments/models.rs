//! Payment Models

use std::fmt;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coursemart_app::domain::payments::{data::NewPayment, gateway::CardDetails, models::Payment};

/// Card to charge
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CardRequest {
    pub number: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub cvc: String,

    #[serde(default)]
    pub holder_name: String,
}

/// Pay for an order
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePaymentRequest {
    pub order_id: Uuid,
    pub card: CardRequest,
}

impl fmt::Debug for CreatePaymentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatePaymentRequest")
            .field("order_id", &self.order_id)
            .finish_non_exhaustive()
    }
}

impl From<CreatePaymentRequest> for NewPayment {
    fn from(request: CreatePaymentRequest) -> Self {
        let CardRequest {
            number,
            exp_month,
            exp_year,
            cvc,
            holder_name,
        } = request.card;

        NewPayment {
            order: request.order_id.into(),
            card: CardDetails {
                number,
                exp_month,
                exp_year,
                cvc,
                holder_name,
            },
        }
    }
}

/// Payment response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_id: Uuid,

    /// `pending`, `success` or `failed`
    pub status: String,

    /// Gateway charge id, set once the charge succeeded
    pub transaction_id: Option<String>,

    /// Charged amount in minor units
    pub amount: u64,

    pub currency: String,
    pub provider: String,
    pub failure_reason: Option<String>,
    pub is_successful: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        PaymentResponse {
            id: payment.uuid().into(),
            order_id: payment.order().into(),
            user_id: payment.user().into(),
            status: payment.status().as_str().to_string(),
            transaction_id: payment.transaction_id().map(str::to_string),
            amount: payment.amount(),
            currency: payment.currency().to_string(),
            provider: payment.provider().to_string(),
            failure_reason: payment.failure_reason().map(str::to_string),
            is_successful: payment.is_successful(),
            created_at: payment.audit().created_at().to_string(),
            updated_at: payment.audit().updated_at().to_string(),
        }
    }
}
