//! Response envelope shared by every API route.

use salvo::{
    catcher::Catcher,
    handler,
    http::{ResBody, StatusCode},
    oapi::{self, Components, EndpointOutRegister, Operation, ToSchema},
    prelude::{Json, Response},
    writing::Scribe,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Successful response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiEnvelope<T: ToSchema + 'static> {
    pub is_success: bool,
    pub data: Option<T>,
    pub error_message: Vec<String>,
    pub status_code: u16,
}

/// Failed response body. `data` is always `null`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiErrorEnvelope {
    pub is_success: bool,
    pub data: Option<String>,
    pub error_message: Vec<String>,
    pub status_code: u16,
}

/// Wrap `data` in a successful envelope.
pub(crate) fn ok<T: ToSchema + 'static>(data: T) -> Json<ApiEnvelope<T>> {
    Json(ApiEnvelope {
        is_success: true,
        data: Some(data),
        error_message: Vec::new(),
        status_code: StatusCode::OK.as_u16(),
    })
}

/// A successful envelope whose `data` is `null`.
pub(crate) fn empty<T: ToSchema + 'static>() -> Json<ApiEnvelope<T>> {
    Json(ApiEnvelope {
        is_success: true,
        data: None,
        error_message: Vec::new(),
        status_code: StatusCode::OK.as_u16(),
    })
}

const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// A failed request, rendered as an [`ApiErrorEnvelope`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {}", .messages.join("; "))]
pub(crate) struct ApiError {
    status: StatusCode,
    messages: Vec<String>,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            messages: vec![message.into()],
        }
    }

    /// A business rule rejected the request.
    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub(crate) fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub(crate) fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Log `source` and hide it behind a generic message.
    pub(crate) fn internal(context: &str, source: &dyn std::fmt::Display) -> Self {
        error!("{context}: {source}");

        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }

    pub(crate) const fn status(&self) -> StatusCode {
        self.status
    }

    pub(crate) fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl Scribe for ApiError {
    fn render(self, res: &mut Response) {
        res.status_code(self.status);
        res.render(Json(ApiErrorEnvelope {
            is_success: false,
            data: None,
            error_message: self.messages,
            status_code: self.status.as_u16(),
        }));
    }
}

/// Catcher goal for errors salvo raises before or around a handler:
/// unparseable params or bodies, unknown routes, disallowed methods and
/// caught panics. Responses a handler already wrote are left alone.
#[handler]
async fn unhandled_error(res: &mut Response) {
    let status = res.status_code.unwrap_or(StatusCode::NOT_FOUND);
    let message = unhandled_error_message(status, &res.body);

    res.render(ApiError::new(status, message));
}

fn unhandled_error_message(status: StatusCode, body: &ResBody) -> String {
    if status.is_server_error() {
        return INTERNAL_ERROR_MESSAGE.to_string();
    }

    match body {
        ResBody::Error(error) if !error.brief.is_empty() => error.brief.clone(),
        _ => status
            .canonical_reason()
            .unwrap_or("Request rejected")
            .to_string(),
    }
}

/// Renders every unhandled error status as an [`ApiErrorEnvelope`].
pub(crate) fn catcher() -> Catcher {
    Catcher::new(unhandled_error)
}

impl EndpointOutRegister for ApiError {
    fn register(components: &mut Components, operation: &mut Operation) {
        for (status, description) in [
            (StatusCode::BAD_REQUEST, "Request rejected"),
            (StatusCode::UNAUTHORIZED, "Missing or invalid access token"),
            (StatusCode::FORBIDDEN, "Resource belongs to another user"),
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        ] {
            operation.responses.insert(
                status.as_str(),
                oapi::Response::new(description).add_content(
                    "application/json",
                    ApiErrorEnvelope::to_schema(components),
                ),
            );
        }
    }
}
