//! Authentication
//!
//! Short-lived signed access tokens plus one rotating refresh token per user.

mod access;
mod errors;
mod models;
mod repository;
mod service;
mod token;

pub use access::*;
pub use errors::*;
pub use models::*;
pub use service::*;
pub use token::*;
