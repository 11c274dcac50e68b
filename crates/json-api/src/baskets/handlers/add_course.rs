//! Add Course To Basket Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    baskets::{
        errors::into_api_error,
        models::{BasketCourseQuery, BasketResponse},
    },
    envelope::{ApiEnvelope, ApiError, ok},
    extensions::*,
    state::State,
};

/// Add Course To Basket Handler
///
/// Adds a course at its current price, creating the basket if needed.
#[endpoint(
    tags("baskets"),
    summary = "Add Course To Basket",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Course added"),
        (status_code = StatusCode::BAD_REQUEST, description = "Course unknown, unavailable or already in the basket"),
        (status_code = StatusCode::FORBIDDEN, description = "Basket belongs to another user"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "baskets.add_course",
    skip(query, depot),
    fields(
        user_uuid = tracing::field::Empty,
        course_uuid = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    query: BasketCourseQuery,
    depot: &mut Depot,
) -> Result<Json<ApiEnvelope<BasketResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.authorize_user(query.user_id.into())?;
    let course = query.course_id;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(user));
    span.record("course_uuid", tracing::field::display(course));

    let basket = state
        .app
        .baskets
        .add_course(user, course.into())
        .await
        .map_err(into_api_error)?;

    tracing::info!(basket_uuid = %basket.uuid(), "added course to basket");

    Ok(ok(basket.into()))
}
