//! Per-request span, request id propagation and completion logging.

mod parent_context;
mod request_ids;
mod spans;

use std::time::{Duration, Instant};

use salvo::{
    Request, handler,
    http::StatusCode,
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::{Instrument as _, Span, error, info, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

use super::settings;

const REQUEST_ID_DEPOT_KEY: &str = "request_id";

const UNLOGGED_PATHS: &[&str] = &["/healthcheck"];

/// How a finished request is reported beyond the `request.completed` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Ok,
    ClientError,
    ServerError,
}

impl Outcome {
    fn classify(status: StatusCode) -> Self {
        if status.is_server_error() {
            Self::ServerError
        } else if status.is_client_error() {
            Self::ClientError
        } else {
            Self::Ok
        }
    }
}

#[derive(Debug)]
struct RequestLog {
    request_id: String,
    method: String,
    path: String,
    started: Instant,
}

impl RequestLog {
    fn start(req: &Request) -> Self {
        Self {
            request_id: request_ids::resolve_request_id(
                req.header::<String>(request_ids::REQUEST_ID_HEADER),
            ),
            method: req.method().to_string(),
            path: req.uri().path().to_owned(),
            started: Instant::now(),
        }
    }

    fn span(&self, req: &Request) -> Span {
        let span = tracing::info_span!(
            parent: None,
            "http.request",
            otel.name = %spans::request_span_name(&self.method, &self.path).otel_span_name,
            otel.kind = "server",
            request_id = %self.request_id,
            method = %self.method,
            path = %self.path,
            remote_addr = %req.remote_addr(),
            status = tracing::field::Empty,
            duration_ms = tracing::field::Empty
        );

        if settings::otel_parent_propagation_enabled()
            && let Some(parent) = parent_context::extract_parent_context(req.headers())
            && let Err(source) = span.set_parent(parent)
        {
            warn!("failed to set parent context on request span: {source}");
        }

        span
    }

    fn finish(&self, span: &Span, status: StatusCode) {
        let elapsed = self.started.elapsed();
        let duration_ms = elapsed.as_millis();
        let threshold = Duration::from_millis(settings::slow_request_threshold_ms());

        span.record("status", status.as_u16());
        span.record("duration_ms", duration_ms);

        let _entered = span.enter();

        info!(status = status.as_u16(), duration_ms, "request.completed");

        match Outcome::classify(status) {
            Outcome::ServerError => error!(
                status = status.as_u16(),
                method = %self.method,
                path = %self.path,
                request_id = %self.request_id,
                "server error response"
            ),
            Outcome::ClientError => warn!(
                status = status.as_u16(),
                method = %self.method,
                path = %self.path,
                request_id = %self.request_id,
                "client error response"
            ),
            Outcome::Ok => {}
        }

        if elapsed > threshold {
            warn!(
                method = %self.method,
                path = %self.path,
                request_id = %self.request_id,
                duration_ms,
                threshold_ms = threshold.as_millis(),
                "slow request detected"
            );
        }
    }
}

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if UNLOGGED_PATHS.contains(&req.uri().path()) {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let log = RequestLog::start(req);

    depot.insert(REQUEST_ID_DEPOT_KEY, log.request_id.clone());
    request_ids::set_request_id_header(res, &log.request_id);

    let span = log.span(req);

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    log.finish(&span, request_ids::response_status_or_ok(res.status_code));
}

#[cfg(test)]
mod tests {
    use salvo::{prelude::*, test::TestClient};

    use super::*;

    #[handler]
    async fn teapot(res: &mut Response) {
        res.status_code(StatusCode::IM_A_TEAPOT);
    }

    fn service() -> Service {
        Service::new(
            Router::new()
                .hoop(request_logging)
                .push(Router::with_path("brew").get(teapot)),
        )
    }

    #[test]
    fn statuses_are_classified_by_class() {
        assert_eq!(Outcome::classify(StatusCode::OK), Outcome::Ok);
        assert_eq!(Outcome::classify(StatusCode::NOT_FOUND), Outcome::ClientError);
        assert_eq!(
            Outcome::classify(StatusCode::SERVICE_UNAVAILABLE),
            Outcome::ServerError
        );
    }

    #[tokio::test]
    async fn caller_request_id_is_echoed() {
        let res = TestClient::get("http://localhost/brew")
            .add_header(request_ids::REQUEST_ID_HEADER, "trace-me", true)
            .send(&service())
            .await;

        assert_eq!(res.status_code, Some(StatusCode::IM_A_TEAPOT));
        assert_eq!(
            res.headers()
                .get(request_ids::REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok()),
            Some("trace-me")
        );
    }

    #[tokio::test]
    async fn missing_request_id_is_generated() {
        let res = TestClient::get("http://localhost/brew")
            .send(&service())
            .await;

        assert!(
            res.headers().contains_key(request_ids::REQUEST_ID_HEADER),
            "response should carry a request id"
        );
    }
}
