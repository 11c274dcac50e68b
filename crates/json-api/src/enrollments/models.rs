//! Enrollment Models

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coursemart_app::domain::enrollments::records::EnrollmentRecord;

/// Enrollment Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnrollmentRequest {
    pub user_id: Uuid,
    pub course_id: Uuid,
}

/// Enrollment Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnrollmentResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: String,
}

impl From<EnrollmentRecord> for EnrollmentResponse {
    fn from(enrollment: EnrollmentRecord) -> Self {
        EnrollmentResponse {
            id: enrollment.uuid.into(),
            user_id: enrollment.user.into(),
            course_id: enrollment.course.into(),
            enrolled_at: enrollment.enrolled_at.to_string(),
        }
    }
}
