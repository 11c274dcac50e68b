//! Payment errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::{
    orders::{OrderError, models::OrderStatus},
    payments::models::{Payment, PaymentStatus},
};

/// Rule violations raised by the [`Payment`] aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("order is {0} and cannot be paid")]
    OrderNotPayable(OrderStatus),

    #[error("payment is already {0}")]
    AlreadySettled(PaymentStatus),

    #[error("a successful payment requires a transaction id")]
    MissingTransactionId,

    #[error("unknown payment status {0:?}")]
    UnknownStatus(String),
}

#[derive(Debug, Error)]
pub enum PaymentsServiceError {
    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("payment not found")]
    NotFound,

    #[error("order not found")]
    OrderNotFound,

    #[error("a payment already exists for this order")]
    PaymentExists,

    /// The gateway refused the charge or did not answer in time. The failed
    /// payment has been recorded.
    #[error("payment declined: {}", .payment.failure_reason().unwrap_or("unknown reason"))]
    Declined { payment: Box<Payment> },

    #[error("payment settlement was interrupted")]
    Settlement(#[source] tokio::task::JoinError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for PaymentsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::PaymentExists,
            Some(ErrorKind::ForeignKeyViolation | ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
