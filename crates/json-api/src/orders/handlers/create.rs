//! Create Order From Basket Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    envelope::{ApiEnvelope, ApiError, ok},
    extensions::*,
    orders::{errors::into_api_error, models::OrderResponse},
    state::State,
};

/// Create Order From Basket Handler
///
/// Freezes the caller's basket into a pending order and retires the basket.
#[endpoint(
    tags("orders"),
    summary = "Create Order From Basket",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Basket unknown or empty"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.create",
    skip(basket, depot),
    fields(
        user_uuid = tracing::field::Empty,
        basket_uuid = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    basket: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ApiEnvelope<OrderResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.current_user_or_401()?;
    let basket = basket.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(user));
    span.record("basket_uuid", tracing::field::display(basket));

    let order = state
        .app
        .orders
        .create_from_basket(user, basket.into())
        .await
        .map_err(into_api_error)?;

    tracing::info!(order_uuid = %order.uuid(), total = order.total(), "created order");

    Ok(ok(OrderResponse::from(&order)))
}
