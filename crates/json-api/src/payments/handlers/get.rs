//! Get Payment Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    envelope::{ApiEnvelope, ApiError, ok},
    extensions::*,
    payments::{errors::into_api_error, models::PaymentResponse},
    state::State,
};

/// Get Payment Handler
#[endpoint(
    tags("payments"),
    summary = "Get Payment",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Payment found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Payment not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "payments.get",
    skip(payment, depot),
    fields(payment_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    payment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ApiEnvelope<PaymentResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.current_user_or_401()?;
    let payment = payment.into_inner();

    tracing::Span::current().record("payment_uuid", tracing::field::display(payment));

    let payment = state
        .app
        .payments
        .get_payment(user, payment.into())
        .await
        .map_err(into_api_error)?;

    Ok(ok(PaymentResponse::from(&payment)))
}
