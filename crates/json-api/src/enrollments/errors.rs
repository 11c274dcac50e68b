//! Enrollment Errors

use coursemart_app::domain::enrollments::EnrollmentsServiceError;

use crate::envelope::ApiError;

pub(crate) fn into_api_error(error: EnrollmentsServiceError) -> ApiError {
    match error {
        EnrollmentsServiceError::AlreadyEnrolled => {
            ApiError::bad_request("User is already enrolled in this course")
        }
        EnrollmentsServiceError::NoCompletedOrders => {
            ApiError::bad_request("User has no completed orders")
        }
        EnrollmentsServiceError::NotPurchased => {
            ApiError::bad_request("Course has not been purchased")
        }
        EnrollmentsServiceError::NotFound => ApiError::bad_request("Enrollment not found"),
        EnrollmentsServiceError::Sql(source) => {
            ApiError::internal("failed to access enrollments", &source)
        }
    }
}
