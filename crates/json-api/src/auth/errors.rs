//! Session Errors

use coursemart_app::{auth::SessionsServiceError, domain::users::UsersError};

use crate::envelope::ApiError;

pub(crate) fn into_api_error(error: SessionsServiceError) -> ApiError {
    match error {
        SessionsServiceError::InvalidCredentials => {
            ApiError::bad_request("Invalid email or password")
        }
        SessionsServiceError::NotFound => ApiError::bad_request("Refresh token not found"),
        SessionsServiceError::Expired => ApiError::bad_request("Refresh token has expired"),
        SessionsServiceError::InvalidAccessToken => {
            ApiError::unauthorized("Access token is invalid or expired")
        }
        SessionsServiceError::Users(UsersError::NotFound) => {
            ApiError::bad_request("User not found")
        }
        SessionsServiceError::Users(source) => ApiError::internal("user lookup failed", &source),
        SessionsServiceError::Jwt(source) => {
            ApiError::internal("failed to sign access token", &source)
        }
        SessionsServiceError::Time(source) => {
            ApiError::internal("failed to compute token expiry", &source)
        }
        SessionsServiceError::Sql(source) => {
            ApiError::internal("failed to access refresh sessions", &source)
        }
    }
}
