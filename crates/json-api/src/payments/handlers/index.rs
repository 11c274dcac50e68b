//! List User Payments Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    envelope::{ApiEnvelope, ApiError, ok},
    extensions::*,
    payments::{errors::into_api_error, models::PaymentResponse},
    state::State,
};

/// List User Payments Handler
///
/// Payment history, newest first.
#[endpoint(
    tags("payments"),
    summary = "List User Payments",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Payments"),
        (status_code = StatusCode::FORBIDDEN, description = "Payments belong to another user"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "payments.index",
    skip(user, depot),
    fields(user_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    user: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ApiEnvelope<Vec<PaymentResponse>>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.authorize_user(user.into_inner().into())?;

    tracing::Span::current().record("user_uuid", tracing::field::display(user));

    let payments = state
        .app
        .payments
        .list_payments(user)
        .await
        .map_err(into_api_error)?;

    Ok(ok(payments.iter().map(PaymentResponse::from).collect()))
}
