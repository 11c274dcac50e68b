//! Orders
//!
//! An order freezes a basket's items and prices at checkout. Items never
//! change afterwards; only the status moves, from pending to exactly one
//! terminal state.

pub mod errors;
pub mod models;
mod repository;
pub mod service;

pub use errors::{OrderError, OrdersServiceError};
pub(crate) use repository::PgOrdersRepository;
pub use service::*;
