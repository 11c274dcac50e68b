//! Payments
//!
//! One payment per order. The payment row is written before the gateway is
//! called and settled afterwards, so every charge attempt leaves a record.

pub mod data;
pub mod errors;
pub mod gateway;
pub mod models;
mod repository;
pub mod service;
pub mod stripe;

pub use errors::{PaymentError, PaymentsServiceError};
pub(crate) use repository::PgPaymentsRepository;
pub use service::*;
