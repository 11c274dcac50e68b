//! Session service errors.

use sqlx::Error;
use thiserror::Error;

use crate::domain::users::UsersError;

#[derive(Debug, Error)]
pub enum SessionsServiceError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("refresh session not found")]
    NotFound,

    #[error("refresh session expired")]
    Expired,

    #[error("access token is invalid or expired")]
    InvalidAccessToken,

    #[error("user lookup failed")]
    Users(#[from] UsersError),

    #[error("token signing error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("token expiry out of range")]
    Time(#[from] jiff::Error),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for SessionsServiceError {
    fn from(error: Error) -> Self {
        Self::Sql(error)
    }
}
