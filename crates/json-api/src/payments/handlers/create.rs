//! Create Payment Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    envelope::{ApiEnvelope, ApiError, ok},
    extensions::*,
    payments::{
        errors::into_api_error,
        models::{CreatePaymentRequest, PaymentResponse},
    },
    state::State,
};

/// Create Payment Handler
///
/// Charges the card for the order total. A successful charge completes the
/// order; a decline is recorded as a failed payment and returned as 400.
#[endpoint(
    tags("payments"),
    summary = "Create Payment",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Payment succeeded"),
        (status_code = StatusCode::BAD_REQUEST, description = "Order not payable, already paid, or card declined"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "payments.create",
    skip(json, depot),
    fields(
        user_uuid = tracing::field::Empty,
        order_uuid = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreatePaymentRequest>,
    depot: &mut Depot,
) -> Result<Json<ApiEnvelope<PaymentResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.current_user_or_401()?;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(user));
    span.record("order_uuid", tracing::field::display(request.order_id));

    let payment = state
        .app
        .payments
        .process_payment(user, request.into())
        .await
        .map_err(into_api_error)?;

    tracing::info!(
        payment_uuid = %payment.uuid(),
        transaction_id = payment.transaction_id().unwrap_or_default(),
        "payment succeeded"
    );

    Ok(ok(PaymentResponse::from(&payment)))
}
