//! Delete Enrollment Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    enrollments::{errors::into_api_error, models::EnrollmentRequest},
    envelope::{ApiEnvelope, ApiError, ok},
    extensions::*,
    state::State,
};

/// Delete Enrollment Handler
///
/// Withdraws from a course. The enrollment is kept as history.
#[endpoint(
    tags("enrollments"),
    summary = "Unenroll From Course",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Unenrolled"),
        (status_code = StatusCode::BAD_REQUEST, description = "Enrollment not found"),
        (status_code = StatusCode::FORBIDDEN, description = "Cannot unenroll another user"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "enrollments.delete",
    skip(json, depot),
    fields(
        user_uuid = tracing::field::Empty,
        course_uuid = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<EnrollmentRequest>,
    depot: &mut Depot,
) -> Result<Json<ApiEnvelope<bool>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();
    let user = depot.authorize_user(request.user_id.into())?;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(user));
    span.record("course_uuid", tracing::field::display(request.course_id));

    state
        .app
        .enrollments
        .unenroll(user, request.course_id.into())
        .await
        .map_err(into_api_error)?;

    tracing::info!(course_uuid = %request.course_id, "unenrolled user");

    Ok(ok(true))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use coursemart_app::domain::{
        courses::records::CourseUuid, enrollments::EnrollmentsServiceError,
    };

    use crate::test_helpers::{Mocks, TEST_USER_UUID, service_with};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service_with(mocks, Router::with_path("enrollments").delete(handler))
    }

    #[tokio::test]
    async fn test_unenroll_succeeds() -> TestResult {
        let course = CourseUuid::new();

        let mut mocks = Mocks::new();

        mocks
            .enrollments
            .expect_unenroll()
            .once()
            .withf(move |user, c| *user == TEST_USER_UUID && *c == course)
            .return_once(|_, _| Ok(()));

        let mut res = TestClient::delete("http://example.com/enrollments")
            .json(&json!({
                "userId": TEST_USER_UUID.to_string(),
                "courseId": course.to_string()
            }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: Value = res.take_json().await?;

        assert_eq!(body["data"], json!(true));

        Ok(())
    }

    #[tokio::test]
    async fn test_unenroll_without_enrollment_returns_400() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .enrollments
            .expect_unenroll()
            .once()
            .return_once(|_, _| Err(EnrollmentsServiceError::NotFound));

        let res = TestClient::delete("http://example.com/enrollments")
            .json(&json!({
                "userId": TEST_USER_UUID.to_string(),
                "courseId": CourseUuid::new().to_string()
            }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
