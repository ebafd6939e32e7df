//! Filter sidebar: form defaults, location choices and the submit-validate-redirect cycle.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::debug;

use crate::application::repos::{ListingRepository, RepoError};
use crate::domain::filters::{
    FilterState, FilterValidationError, RawFilterInput, validate_and_encode,
};
use crate::domain::types::JobType;
use crate::infra::telemetry::{METRIC_FILTER_SUBMISSIONS_TOTAL, METRIC_LISTING_QUERY_MS};
use crate::presentation::views::{SelectOptionView, SidebarView};

pub const FILTER_ACTION_PATH: &str = "/filter";
const RESULTS_PATH: &str = "/";

/// Navigation target produced by a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRedirect {
    pub query: RawFilterInput,
}

impl FilterRedirect {
    /// `/` when no filter survived encoding, `/?<query>` otherwise.
    pub fn target(&self) -> String {
        if self.query.is_empty() {
            RESULTS_PATH.to_string()
        } else {
            format!("{RESULTS_PATH}?{}", self.query.to_query_string())
        }
    }
}

#[derive(Clone)]
pub struct SidebarService {
    listings: Arc<dyn ListingRepository>,
}

impl SidebarService {
    pub fn new(listings: Arc<dyn ListingRepository>) -> Self {
        Self { listings }
    }

    pub async fn distinct_locations(&self) -> Result<Vec<String>, RepoError> {
        let started = Instant::now();
        let locations = self.listings.find_distinct_locations().await?;
        histogram!(METRIC_LISTING_QUERY_MS, "query" => "distinct_locations")
            .record(started.elapsed().as_secs_f64() * 1000.0);

        Ok(unique_locations(locations))
    }

    pub async fn sidebar_view(&self, defaults: &FilterState) -> Result<SidebarView, RepoError> {
        let locations = self.distinct_locations().await?;
        Ok(build_sidebar_view(defaults, &locations))
    }

    /// Validation failures are returned to the caller untouched.
    pub fn submit(&self, raw: &RawFilterInput) -> Result<FilterRedirect, FilterValidationError> {
        match validate_and_encode(raw) {
            Ok(query) => {
                counter!(METRIC_FILTER_SUBMISSIONS_TOTAL, "outcome" => "redirect").increment(1);
                let redirect = FilterRedirect { query };
                debug!(
                    target = "devjobs::filters",
                    location = %redirect.target(),
                    "filter submission accepted"
                );
                Ok(redirect)
            }
            Err(err) => {
                counter!(METRIC_FILTER_SUBMISSIONS_TOTAL, "outcome" => "rejected").increment(1);
                debug!(
                    target = "devjobs::filters",
                    field = err.field(),
                    error = %err,
                    "filter submission rejected"
                );
                Err(err)
            }
        }
    }
}

fn unique_locations(locations: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    locations
        .into_iter()
        .filter(|location| !location.trim().is_empty())
        .filter(|location| seen.insert(location.clone()))
        .collect()
}

pub fn build_sidebar_view(defaults: &FilterState, locations: &[String]) -> SidebarView {
    let selected_type = defaults.job_type.as_deref();
    let mut type_options = vec![SelectOptionView {
        value: String::new(),
        label: "All Types".to_string(),
        selected: selected_type.is_none(),
    }];
    type_options.extend(JobType::ALL.into_iter().map(|job_type| SelectOptionView {
        value: job_type.as_str().to_string(),
        label: job_type.as_str().to_string(),
        selected: selected_type == Some(job_type.as_str()),
    }));

    let selected_location = defaults.location.as_deref();
    let mut location_options = vec![SelectOptionView {
        value: String::new(),
        label: "All Locations".to_string(),
        selected: selected_location.is_none(),
    }];
    location_options.extend(locations.iter().map(|location| SelectOptionView {
        value: location.clone(),
        label: location.clone(),
        selected: selected_location == Some(location.as_str()),
    }));

    SidebarView {
        action: FILTER_ACTION_PATH,
        query: defaults.query.clone().unwrap_or_default(),
        type_options,
        location_options,
        remote_checked: defaults.remote_only,
        has_error: false,
        error_message: String::new(),
    }
}
