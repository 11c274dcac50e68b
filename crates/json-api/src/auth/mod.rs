//! Authentication
//!
//! Bearer middleware plus the login, refresh and logout endpoints.

mod errors;
pub(crate) mod handlers;
pub(crate) mod middleware;
mod models;

pub(crate) use handlers::*;
