//! Marketplace Domain Concerns

pub mod baskets;
pub mod courses;
pub mod enrollments;
pub mod orders;
pub mod payments;
pub mod users;
