//! Order errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::{courses::records::CourseUuid, orders::models::OrderStatus};

/// Rule violations raised by the [`Order`](super::models::Order) aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("cannot create an order from an empty basket")]
    EmptyBasket,

    #[error("course {0} appears more than once in the order")]
    DuplicateCourse(CourseUuid),

    #[error("order is {0} and can no longer change")]
    Closed(OrderStatus),

    #[error("order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("unknown order status {0:?}")]
    UnknownStatus(String),
}

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("order not found")]
    NotFound,

    #[error("basket not found")]
    BasketNotFound,

    #[error("an order already exists for this basket")]
    AlreadyExists,

    #[error("order has a pending or successful payment")]
    PaymentActive,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation | ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
