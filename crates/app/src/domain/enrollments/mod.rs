//! Enrollments
//!
//! Access to a course is granted only after a completed order containing it.

pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::EnrollmentsServiceError;
pub use service::*;
