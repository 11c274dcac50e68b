//! Basket Errors

use coursemart_app::domain::baskets::{BasketError, BasketsServiceError};

use crate::envelope::ApiError;

pub(crate) fn into_api_error(error: BasketsServiceError) -> ApiError {
    match error {
        BasketsServiceError::Basket(error) => from_basket_error(error),
        BasketsServiceError::NotFound => ApiError::bad_request("Basket not found"),
        BasketsServiceError::CourseNotFound => ApiError::bad_request("Course not found"),
        BasketsServiceError::Conflict => {
            ApiError::bad_request("Basket was modified concurrently, please retry")
        }
        BasketsServiceError::Sql(source) => ApiError::internal("failed to access basket", &source),
    }
}

fn from_basket_error(error: BasketError) -> ApiError {
    match error {
        BasketError::NotModifiable => {
            ApiError::bad_request("Basket is completed and can no longer be modified")
        }
        BasketError::DuplicateItem(_) => ApiError::bad_request("Course is already in the basket"),
        BasketError::ItemNotFound(_) => ApiError::bad_request("Course is not in the basket"),
        BasketError::CourseUnavailable(_) => {
            ApiError::bad_request("Course is not available for purchase")
        }
        BasketError::EmptyBasket => ApiError::bad_request("Basket is empty"),
        BasketError::AlreadyCompleted => ApiError::bad_request("Basket is already completed"),
        error @ BasketError::UnknownStatus(_) => {
            ApiError::internal("failed to load basket", &error)
        }
    }
}
