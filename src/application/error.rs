use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::domain::filters::FilterValidationError;
use crate::infra::error::InfraError;

/// Diagnostics a handler attaches to a failed response for the response logger.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    /// Outermost error first, followed by its `source()` chain.
    pub messages: Vec<String>,
    /// Form field that failed validation, for rejected filter submissions.
    pub field: Option<&'static str>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let messages = std::iter::successors(Some(error), |&current| current.source())
            .map(ToString::to_string)
            .collect();
        Self {
            source,
            messages,
            field: None,
        }
    }

    pub fn from_message(source: &'static str, message: impl Into<String>) -> Self {
        Self {
            source,
            messages: vec![message.into()],
            field: None,
        }
    }

    pub fn rejected_filter(source: &'static str, error: &FilterValidationError) -> Self {
        Self {
            field: Some(error.field()),
            ..Self::from_error(source, error)
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Plain-text failure response: a fixed public message plus the attached report.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(status: StatusCode, public_message: &'static str, report: ErrorReport) -> Self {
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

/// Process-level failures surfaced by the binary entry point.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("outer failure")]
    struct Outer {
        #[source]
        inner: std::io::Error,
    }

    #[test]
    fn report_collects_source_chain() {
        let error = Outer {
            inner: std::io::Error::other("disk unplugged"),
        };
        let report = ErrorReport::from_error("test", &error);
        assert_eq!(report.messages, vec!["outer failure", "disk unplugged"]);
        assert!(report.field.is_none());
    }

    #[test]
    fn rejected_filter_report_names_the_field() {
        let error = FilterValidationError::TooLong {
            field: "location",
            max: 100,
        };
        let report = ErrorReport::rejected_filter("test", &error);
        assert_eq!(report.field, Some("location"));
        assert_eq!(
            report.messages,
            vec!["`location` must be at most 100 characters"]
        );
    }

    #[test]
    fn http_error_attaches_report_to_response() {
        let response = HttpError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Database timeout",
            ErrorReport::from_message("application::error::tests", "statement cancelled"),
        )
        .into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let report = response
            .extensions()
            .get::<ErrorReport>()
            .expect("report attached");
        assert_eq!(report.source, "application::error::tests");
        assert_eq!(report.messages, vec!["statement cancelled"]);
    }
}
