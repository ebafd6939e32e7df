mod middleware;
mod public;

pub use middleware::REQUEST_ID_HEADER;
pub use public::{HttpState, build_router};

use crate::application::error::{ErrorReport, HttpError};
use crate::application::repos::RepoError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

fn db_health_response(result: Result<(), RepoError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error("infra::http::db_health", &err).attach(&mut response);
            response
        }
    }
}

/// Store timeouts are retryable (503); anything else is a server fault (500).
pub fn repo_error_to_http(source: &'static str, err: RepoError) -> HttpError {
    let (status, public_message) = match &err {
        RepoError::Timeout => (
            StatusCode::SERVICE_UNAVAILABLE,
            "The job board is busy, please try again shortly",
        ),
        RepoError::Persistence(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Job listings could not be loaded",
        ),
    };
    HttpError::new(status, public_message, ErrorReport::from_error(source, &err))
}
