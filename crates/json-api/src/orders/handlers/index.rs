//! List User Orders Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    envelope::{ApiEnvelope, ApiError, ok},
    extensions::*,
    orders::{errors::into_api_error, models::OrderResponse},
    state::State,
};

/// List User Orders Handler
///
/// Order history, newest first.
#[endpoint(
    tags("orders"),
    summary = "List User Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Orders"),
        (status_code = StatusCode::FORBIDDEN, description = "Orders belong to another user"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.index",
    skip(user, depot),
    fields(user_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    user: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ApiEnvelope<Vec<OrderResponse>>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.authorize_user(user.into_inner().into())?;

    tracing::Span::current().record("user_uuid", tracing::field::display(user));

    let orders = state
        .app
        .orders
        .list_orders(user)
        .await
        .map_err(into_api_error)?;

    Ok(ok(orders.iter().map(OrderResponse::from).collect()))
}
