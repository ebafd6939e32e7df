use std::sync::Arc;

use crate::application::repos::RepoError;
use crate::application::results::JobResultsService;
use crate::application::sidebar::SidebarService;
use crate::domain::filters::{
    FilterState, FilterValidationError, RawFilterInput, parse_checkbox_flag,
};
use crate::presentation::views::HomePageContext;

/// Composes the filter sidebar and the results list for one page render.
#[derive(Clone)]
pub struct HomePageService {
    sidebar: Arc<SidebarService>,
    results: Arc<JobResultsService>,
}

impl HomePageService {
    pub fn new(sidebar: Arc<SidebarService>, results: Arc<JobResultsService>) -> Self {
        Self { sidebar, results }
    }

    /// The location and results reads are independent and run concurrently.
    pub async fn page_context(&self, filters: &FilterState) -> Result<HomePageContext, RepoError> {
        let (sidebar, results) = tokio::try_join!(
            self.sidebar.sidebar_view(filters),
            self.results.results_view(filters)
        )?;

        Ok(HomePageContext { sidebar, results })
    }

    /// Re-renders the page for a rejected submission, keeping what the user typed.
    pub async fn rejected_submission(
        &self,
        raw: &RawFilterInput,
        error: &FilterValidationError,
    ) -> Result<HomePageContext, RepoError> {
        // A form posts the checkbox as `on`, which the URL rule would read as unticked.
        let filters = FilterState {
            remote_only: parse_checkbox_flag(raw.remote.as_deref()),
            ..FilterState::decode(raw)
        };
        let mut context = self.page_context(&filters).await?;
        context.sidebar = context.sidebar.with_error(error.to_string());
        Ok(context)
    }
}
