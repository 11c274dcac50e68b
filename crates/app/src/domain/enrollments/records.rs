//! Enrollment Records

use jiff::Timestamp;

use crate::{
    audit::AuditMetadata,
    domain::{courses::records::CourseUuid, users::records::UserUuid},
    uuids::TypedUuid,
};

/// Enrollment UUID
pub type EnrollmentUuid = TypedUuid<EnrollmentRecord>;

/// Enrollment Record
#[derive(Debug, Clone)]
pub struct EnrollmentRecord {
    pub uuid: EnrollmentUuid,
    pub user: UserUuid,
    pub course: CourseUuid,
    pub enrolled_at: Timestamp,
    pub audit: AuditMetadata,
}
