//! Order Errors

use coursemart_app::domain::orders::{OrderError, OrdersServiceError};

use crate::envelope::ApiError;

pub(crate) fn into_api_error(error: OrdersServiceError) -> ApiError {
    match error {
        OrdersServiceError::Order(error) => from_order_error(error),
        OrdersServiceError::NotFound => ApiError::bad_request("Order not found"),
        OrdersServiceError::BasketNotFound => ApiError::bad_request("Basket not found"),
        OrdersServiceError::AlreadyExists => {
            ApiError::bad_request("An order already exists for this basket")
        }
        OrdersServiceError::PaymentActive => {
            ApiError::bad_request("Order has a pending or successful payment")
        }
        OrdersServiceError::Sql(source) => ApiError::internal("failed to access orders", &source),
    }
}

pub(crate) fn from_order_error(error: OrderError) -> ApiError {
    match error {
        OrderError::EmptyBasket => {
            ApiError::bad_request("Cannot create an order from an empty basket")
        }
        OrderError::DuplicateCourse(_) => {
            ApiError::bad_request("Basket contains the same course more than once")
        }
        OrderError::Closed(status) => {
            ApiError::bad_request(format!("Order is {status} and can no longer change"))
        }
        OrderError::InvalidTransition { from, to } => {
            ApiError::bad_request(format!("Order cannot move from {from} to {to}"))
        }
        error @ OrderError::UnknownStatus(_) => ApiError::internal("failed to load order", &error),
    }
}
