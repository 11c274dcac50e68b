//! Users
//!
//! The narrow identity surface the commerce core needs: look users up, check a
//! password, read roles. Credential management beyond that lives elsewhere.

pub mod data;
pub mod errors;
pub mod password;
pub mod records;
mod repository;
pub mod service;

pub use errors::UsersError;
pub use service::*;
