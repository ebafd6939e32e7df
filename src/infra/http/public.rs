use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{RawQuery, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};

use crate::{
    application::{
        error::ErrorReport,
        home::HomePageService,
        repos::{HealthCheck, ListingRepository},
        results::JobResultsService,
        sidebar::{FILTER_ACTION_PATH, SidebarService},
    },
    domain::filters::{FilterState, RawFilterInput},
    presentation::views::{
        IndexTemplate, LayoutContext, PageMetaView, render_not_found_response,
        render_template_response,
    },
};

use super::{db_health_response, middleware::trace_requests, repo_error_to_http};

#[derive(Clone)]
pub struct HttpState {
    pub home: Arc<HomePageService>,
    pub sidebar: Arc<SidebarService>,
    pub health: Arc<dyn HealthCheck>,
}

impl HttpState {
    pub fn new(listings: Arc<dyn ListingRepository>, health: Arc<dyn HealthCheck>) -> Self {
        let sidebar = Arc::new(SidebarService::new(listings.clone()));
        let results = Arc::new(JobResultsService::new(listings));
        let home = Arc::new(HomePageService::new(sidebar.clone(), results));

        Self {
            home,
            sidebar,
            health,
        }
    }
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route(FILTER_ACTION_PATH, post(submit_filters))
        .route("/_health/db", get(public_health))
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(trace_requests))
}

async fn index(State(state): State<HttpState>, RawQuery(query): RawQuery) -> Response {
    let raw = RawFilterInput::parse(query.as_deref().unwrap_or_default().as_bytes());
    let filters = FilterState::decode(&raw);

    match state.home.page_context(&filters).await {
        Ok(content) => {
            let view = LayoutContext::new(PageMetaView::home(), content);
            render_template_response(IndexTemplate { view }, StatusCode::OK)
        }
        Err(err) => repo_error_to_http("infra::http::public::index", err).into_response(),
    }
}

/// The body is parsed by hand so a repeated field keeps its first value instead of
/// failing extraction.
async fn submit_filters(State(state): State<HttpState>, body: Bytes) -> Response {
    const SOURCE: &str = "infra::http::public::submit_filters";

    let raw = RawFilterInput::parse(&body);

    let error = match state.sidebar.submit(&raw) {
        Ok(redirect) => return Redirect::to(&redirect.target()).into_response(),
        Err(error) => error,
    };

    match state.home.rejected_submission(&raw, &error).await {
        Ok(content) => {
            let view = LayoutContext::new(PageMetaView::home(), content);
            let mut response =
                render_template_response(IndexTemplate { view }, StatusCode::UNPROCESSABLE_ENTITY);
            ErrorReport::rejected_filter(SOURCE, &error).attach(&mut response);
            response
        }
        Err(err) => repo_error_to_http(SOURCE, err).into_response(),
    }
}

async fn public_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.health.health_check().await)
}

async fn fallback() -> Response {
    render_not_found_response()
}
