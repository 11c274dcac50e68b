//! Course Records

use crate::{audit::AuditMetadata, uuids::TypedUuid};

/// Course UUID
pub type CourseUuid = TypedUuid<CourseRecord>;

/// Course Record
#[derive(Debug, Clone)]
pub struct CourseRecord {
    pub uuid: CourseUuid,
    pub title: String,

    /// Current list price in minor units.
    pub price: u64,

    /// Unpublished courses cannot be sold.
    pub published: bool,

    pub audit: AuditMetadata,
}
