//! Request ID generation and response header helpers.

use salvo::{
    http::{StatusCode, header::HeaderValue},
    prelude::Response,
};
use tracing::warn;
use uuid::Uuid;

pub(super) const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest caller-supplied request id that is propagated as-is.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Reuse the caller's request id when it is usable, otherwise mint one.
pub(super) fn resolve_request_id(header_value: Option<String>) -> String {
    header_value
        .map(|value| value.trim().to_owned())
        .filter(|value| {
            !value.is_empty()
                && value.len() <= MAX_REQUEST_ID_LEN
                && value.chars().all(|c| c.is_ascii_graphic())
        })
        .unwrap_or_else(generate_request_id)
}

pub(super) fn set_request_id_header(res: &mut Response, request_id: &str) {
    let header_value = match HeaderValue::from_str(request_id) {
        Ok(value) => value,
        Err(source) => {
            warn!(
                request_id,
                "could not encode request id for response header: {source}"
            );

            return;
        }
    };

    res.headers_mut().insert(REQUEST_ID_HEADER, header_value);
}

pub(super) fn response_status_or_ok(status_code: Option<StatusCode>) -> StatusCode {
    status_code.unwrap_or(StatusCode::OK)
}

fn generate_request_id() -> String {
    Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_request_id_is_reused() {
        assert_eq!(
            resolve_request_id(Some(" checkout-42 ".to_string())),
            "checkout-42"
        );
    }

    #[test]
    fn blank_oversized_or_binary_ids_are_replaced() {
        for candidate in [
            String::new(),
            "   ".to_string(),
            "x".repeat(MAX_REQUEST_ID_LEN + 1),
            "two words".to_string(),
        ] {
            let resolved = resolve_request_id(Some(candidate.clone()));

            assert_ne!(resolved, candidate, "{candidate:?} should be replaced");
            assert!(Uuid::parse_str(&resolved).is_ok(), "expected uuid, got {resolved}");
        }

        assert!(Uuid::parse_str(&resolve_request_id(None)).is_ok());
    }

    #[test]
    fn missing_status_defaults_to_ok() {
        assert_eq!(response_status_or_ok(None), StatusCode::OK);
        assert_eq!(
            response_status_or_ok(Some(StatusCode::BAD_REQUEST)),
            StatusCode::BAD_REQUEST
        );
    }
}
