//! Basket errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::courses::records::CourseUuid;

/// Rule violations raised by the [`Basket`](super::models::Basket) aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BasketError {
    #[error("basket is completed and can no longer be modified")]
    NotModifiable,

    #[error("course {0} is already in the basket")]
    DuplicateItem(CourseUuid),

    #[error("course {0} is not in the basket")]
    ItemNotFound(CourseUuid),

    #[error("course {0} is not available for purchase")]
    CourseUnavailable(CourseUuid),

    #[error("basket has no items")]
    EmptyBasket,

    #[error("basket is already completed")]
    AlreadyCompleted,

    #[error("unknown basket status {0:?}")]
    UnknownStatus(String),
}

#[derive(Debug, Error)]
pub enum BasketsServiceError {
    #[error(transparent)]
    Basket(#[from] BasketError),

    #[error("basket not found")]
    NotFound,

    #[error("course not found")]
    CourseNotFound,

    #[error("basket was modified concurrently")]
    Conflict,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for BasketsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::Conflict,
            Some(ErrorKind::ForeignKeyViolation | ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
