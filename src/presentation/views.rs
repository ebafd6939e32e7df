use crate::application::error::{ErrorReport, HttpError};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            ErrorReport::from_error(source, &error),
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response() -> Response {
    let view = LayoutContext::new(PageMetaView::not_found(), ErrorPageView::not_found());
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        "no route matched",
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
}

impl PageMetaView {
    pub fn home() -> Self {
        Self {
            title: "Developer jobs".to_string(),
            description: "Find your dream developer job.".to_string(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            description: "The page you requested does not exist.".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(meta: PageMetaView, content: T) -> Self {
        Self { meta, content }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Filter form state: defaults derived from the current filters plus the option domains.
#[derive(Clone, Debug)]
pub struct SidebarView {
    pub action: &'static str,
    pub query: String,
    pub type_options: Vec<SelectOptionView>,
    pub location_options: Vec<SelectOptionView>,
    pub remote_checked: bool,
    pub has_error: bool,
    pub error_message: String,
}

impl SidebarView {
    pub fn with_error(self, message: impl Into<String>) -> Self {
        Self {
            has_error: true,
            error_message: message.into(),
            ..self
        }
    }
}

#[derive(Clone, Debug)]
pub struct JobCard {
    pub slug: String,
    pub title: String,
    pub company_name: String,
    pub job_type: String,
    pub location_label: String,
    pub salary: String,
    pub iso_date: String,
    pub posted: String,
}

#[derive(Clone, Debug)]
pub struct ResultsView {
    pub jobs: Vec<JobCard>,
    pub job_count: usize,
    pub has_results: bool,
}

pub struct HomePageContext {
    pub sidebar: SidebarView,
    pub results: ResultsView,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<HomePageContext>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub action_href: String,
    pub action_label: String,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Head back to the job list to keep searching.".to_string(),
            action_href: "/".to_string(),
            action_label: "Back to jobs".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}
