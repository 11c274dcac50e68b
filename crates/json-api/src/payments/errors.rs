//! Payment Errors

use coursemart_app::domain::payments::{PaymentError, PaymentsServiceError};

use crate::{envelope::ApiError, orders::errors::from_order_error};

pub(crate) fn into_api_error(error: PaymentsServiceError) -> ApiError {
    match error {
        PaymentsServiceError::Payment(PaymentError::OrderNotPayable(status)) => {
            ApiError::bad_request(format!("Order is {status} and cannot be paid"))
        }
        PaymentsServiceError::Payment(PaymentError::AlreadySettled(status)) => {
            ApiError::bad_request(format!("Payment is already {status}"))
        }
        PaymentsServiceError::Payment(
            error @ (PaymentError::MissingTransactionId | PaymentError::UnknownStatus(_)),
        ) => ApiError::internal("failed to settle payment", &error),
        PaymentsServiceError::Order(error) => from_order_error(error),
        PaymentsServiceError::NotFound => ApiError::bad_request("Payment not found"),
        PaymentsServiceError::OrderNotFound => ApiError::bad_request("Order not found"),
        PaymentsServiceError::PaymentExists => {
            ApiError::bad_request("A payment already exists for this order")
        }
        PaymentsServiceError::Declined { payment } => {
            tracing::info!(
                payment_uuid = %payment.uuid(),
                order_uuid = %payment.order(),
                "payment declined"
            );

            ApiError::bad_request(format!(
                "Payment declined: {}",
                payment.failure_reason().unwrap_or("unknown reason")
            ))
        }
        PaymentsServiceError::Settlement(source) => {
            ApiError::internal("payment settlement task failed", &source)
        }
        PaymentsServiceError::Sql(source) => {
            ApiError::internal("failed to access payments", &source)
        }
    }
}
