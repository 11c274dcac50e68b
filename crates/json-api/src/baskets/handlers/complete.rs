//! Complete Basket Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    baskets::{
        errors::into_api_error,
        models::{BasketResponse, BasketUserQuery},
    },
    envelope::{ApiEnvelope, ApiError, ok},
    extensions::*,
    state::State,
};

/// Complete Basket Handler
///
/// Marks the basket as checked out. No order is created; use
/// `POST /orders/from-basket/{basketId}` for that.
#[endpoint(
    tags("baskets"),
    summary = "Complete Basket",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Basket completed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Basket is empty or already completed"),
        (status_code = StatusCode::FORBIDDEN, description = "Basket belongs to another user"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "baskets.complete",
    skip(query, depot),
    fields(user_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    query: BasketUserQuery,
    depot: &mut Depot,
) -> Result<Json<ApiEnvelope<BasketResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.authorize_user(query.user_id.into())?;

    tracing::Span::current().record("user_uuid", tracing::field::display(user));

    let basket = state
        .app
        .baskets
        .complete_basket(user)
        .await
        .map_err(into_api_error)?;

    tracing::info!(basket_uuid = %basket.uuid(), "completed basket");

    Ok(ok(basket.into()))
}
