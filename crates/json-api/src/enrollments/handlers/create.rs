//! Create Enrollment Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    enrollments::{
        errors::into_api_error,
        models::{EnrollmentRequest, EnrollmentResponse},
    },
    envelope::{ApiEnvelope, ApiError, ok},
    extensions::*,
    state::State,
};

/// Create Enrollment Handler
///
/// Grants access to a course bought through a completed order.
#[endpoint(
    tags("enrollments"),
    summary = "Enroll In Course",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Enrolled"),
        (status_code = StatusCode::BAD_REQUEST, description = "Already enrolled or course not purchased"),
        (status_code = StatusCode::FORBIDDEN, description = "Cannot enroll another user"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "enrollments.create",
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
) -> Result<Json<ApiEnvelope<EnrollmentResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();
    let user = depot.authorize_user(request.user_id.into())?;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(user));
    span.record("course_uuid", tracing::field::display(request.course_id));

    let enrollment = state
        .app
        .enrollments
        .enroll(user, request.course_id.into())
        .await
        .map_err(into_api_error)?;

    Ok(ok(enrollment.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use coursemart_app::domain::{
        courses::records::CourseUuid, enrollments::EnrollmentsServiceError,
        users::records::UserUuid,
    };

    use crate::test_helpers::{Mocks, TEST_USER_UUID, make_enrollment, service_with};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service_with(mocks, Router::with_path("enrollments").post(handler))
    }

    #[tokio::test]
    async fn test_enroll_returns_enrollment() -> TestResult {
        let course = CourseUuid::new();
        let enrollment = make_enrollment(TEST_USER_UUID, course);

        let mut mocks = Mocks::new();

        mocks
            .enrollments
            .expect_enroll()
            .once()
            .withf(move |user, c| *user == TEST_USER_UUID && *c == course)
            .return_once(move |_, _| Ok(enrollment));

        let mut res = TestClient::post("http://example.com/enrollments")
            .json(&json!({
                "userId": TEST_USER_UUID.to_string(),
                "courseId": course.to_string()
            }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: Value = res.take_json().await?;

        assert_eq!(body["data"]["courseId"], json!(course.to_string()));

        Ok(())
    }

    #[tokio::test]
    async fn test_enroll_without_purchase_returns_400() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .enrollments
            .expect_enroll()
            .once()
            .return_once(|_, _| Err(EnrollmentsServiceError::NotPurchased));

        let mut res = TestClient::post("http://example.com/enrollments")
            .json(&json!({
                "userId": TEST_USER_UUID.to_string(),
                "courseId": CourseUuid::new().to_string()
            }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        let body: Value = res.take_json().await?;

        assert_eq!(body["errorMessage"], json!(["Course has not been purchased"]));

        Ok(())
    }

    #[tokio::test]
    async fn test_enroll_other_user_returns_403() -> TestResult {
        let mut mocks = Mocks::new();

        mocks.enrollments.expect_enroll().never();

        let res = TestClient::post("http://example.com/enrollments")
            .json(&json!({
                "userId": UserUuid::new().to_string(),
                "courseId": CourseUuid::new().to_string()
            }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
