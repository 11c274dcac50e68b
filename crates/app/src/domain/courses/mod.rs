//! Courses
//!
//! Read-only view of the catalog from the commerce pipeline's point of view.

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::CoursesServiceError;
pub(crate) use repository::PgCoursesRepository;
pub use service::*;
