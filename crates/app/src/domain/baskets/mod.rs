//! Baskets
//!
//! Each user has at most one current basket. It is created lazily on the
//! first mutation and retired once an order has been taken from it.

pub mod errors;
pub mod models;
mod repositories;
pub mod service;

pub use errors::{BasketError, BasketsServiceError};
pub(crate) use repositories::{PgBasketItemsRepository, PgBasketsRepository};
pub use service::*;
