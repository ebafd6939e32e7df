//! Request tracing: every request runs inside a span tagged with a fresh request id, and
//! failed responses are logged with the diagnostics their handler attached.

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

/// Response header echoing the id used in this request's log lines.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const LOG_TARGET: &str = "devjobs::http::response";

pub async fn trace_requests(request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    let query = request.uri().query().map(str::to_owned);
    let started = Instant::now();

    let mut response = next.run(request).instrument(span.clone()).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let report = response.extensions_mut().remove::<ErrorReport>();
    let status = response.status();
    span.in_scope(|| log_failure(status, report, query.as_deref(), started.elapsed()));

    response
}

fn log_failure(
    status: StatusCode,
    report: Option<ErrorReport>,
    query: Option<&str>,
    elapsed: Duration,
) {
    if !status.is_client_error() && !status.is_server_error() {
        return;
    }

    let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    let ErrorReport {
        source,
        messages,
        field,
    } = report.unwrap_or_else(|| ErrorReport {
        source: "unknown",
        messages: Vec::new(),
        field: None,
    });
    let detail = messages
        .first()
        .map(String::as_str)
        .unwrap_or("no diagnostic available");
    let query = query.unwrap_or("");

    if status == StatusCode::UNPROCESSABLE_ENTITY {
        // Rejected filter input is routine; the field is what matters.
        info!(
            target = LOG_TARGET,
            status = status.as_u16(),
            field = field.unwrap_or("unknown"),
            detail,
            elapsed_ms,
            "filter submission re-rendered",
        );
    } else if status.is_server_error() {
        error!(
            target = LOG_TARGET,
            status = status.as_u16(),
            query,
            source,
            detail,
            chain = ?messages,
            elapsed_ms,
            "request failed",
        );
    } else {
        warn!(
            target = LOG_TARGET,
            status = status.as_u16(),
            query,
            source,
            detail,
            elapsed_ms,
            "client request error",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, middleware, response::IntoResponse, routing::get};
    use tower::ServiceExt;

    async fn rejected() -> Response {
        let mut response = StatusCode::UNPROCESSABLE_ENTITY.into_response();
        ErrorReport::from_message("tests", "bad input").attach(&mut response);
        response
    }

    fn router() -> Router {
        Router::new()
            .route("/ok", get(|| async { "ok" }))
            .route("/rejected", get(rejected))
            .layer(middleware::from_fn(trace_requests))
    }

    #[tokio::test]
    async fn every_response_carries_a_request_id() {
        let response = router()
            .oneshot(Request::get("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .expect("request id header")
            .to_str()
            .unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn failure_report_is_consumed_by_the_logger() {
        let response = router()
            .oneshot(Request::get("/rejected").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.extensions().get::<ErrorReport>().is_none());
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }
}
