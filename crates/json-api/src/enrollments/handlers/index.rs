//! List User Enrollments Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    enrollments::{errors::into_api_error, models::EnrollmentResponse},
    envelope::{ApiEnvelope, ApiError, ok},
    extensions::*,
    state::State,
};

/// List User Enrollments Handler
///
/// Active enrollments, oldest first.
#[endpoint(
    tags("enrollments"),
    summary = "List User Enrollments",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Enrollments"),
        (status_code = StatusCode::FORBIDDEN, description = "Enrollments belong to another user"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "enrollments.index",
    skip(user, depot),
    fields(user_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    user: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ApiEnvelope<Vec<EnrollmentResponse>>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.authorize_user(user.into_inner().into())?;

    tracing::Span::current().record("user_uuid", tracing::field::display(user));

    let enrollments = state
        .app
        .enrollments
        .list_enrollments(user)
        .await
        .map_err(into_api_error)?;

    Ok(ok(enrollments
        .into_iter()
        .map(EnrollmentResponse::from)
        .collect()))
}
