//! HTTP span helpers.

use uuid::Uuid;

#[derive(Debug, Clone)]
pub(super) struct RequestSpanName {
    pub(super) otel_span_name: String,
}

pub(super) fn request_span_name(method: &str, path: &str) -> RequestSpanName {
    let otel_path = normalise_path_for_span_name(path);
    let otel_span_name = format!("{method} {otel_path}");

    RequestSpanName { otel_span_name }
}

fn normalise_path_for_span_name(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let mut normalised = String::from("/");

    for (index, segment) in path.trim_start_matches('/').split('/').enumerate() {
        if index > 0 {
            normalised.push('/');
        }

        if Uuid::parse_str(segment).is_ok() {
            normalised.push_str("{uuid}");
        } else {
            normalised.push_str(segment);
        }
    }

    normalised
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_segments_are_collapsed_in_span_names() {
        let names = request_span_name(
            "GET",
            "/orders/0192b6b0-7f0e-7c3a-9d2f-3b1c4a5e6f70",
        );

        assert_eq!(names.otel_span_name, "GET /orders/{uuid}");
    }

    #[test]
    fn static_paths_are_kept_verbatim() {
        assert_eq!(
            request_span_name("POST", "/authentications/login").otel_span_name,
            "POST /authentications/login"
        );
        assert_eq!(request_span_name("GET", "/").otel_span_name, "GET /");
    }
}
