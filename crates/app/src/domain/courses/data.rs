//! Course Data

use crate::domain::courses::records::CourseUuid;

/// New Course Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub uuid: CourseUuid,
    pub title: String,
    pub price: u64,
    pub published: bool,
}
