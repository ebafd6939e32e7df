use std::sync::Arc;
use std::time::Instant;

use metrics::histogram;

use crate::application::repos::{JobQueryFilter, ListingRepository, RepoError};
use crate::domain::entities::JobRecord;
use crate::domain::filters::FilterState;
use crate::domain::types::LocationType;
use crate::infra::telemetry::METRIC_LISTING_QUERY_MS;
use crate::presentation::views::{JobCard, ResultsView};

const WORLDWIDE_LABEL: &str = "Worldwide";

#[derive(Clone)]
pub struct JobResultsService {
    listings: Arc<dyn ListingRepository>,
}

impl JobResultsService {
    pub fn new(listings: Arc<dyn ListingRepository>) -> Self {
        Self { listings }
    }

    pub async fn results_view(&self, filters: &FilterState) -> Result<ResultsView, RepoError> {
        let query_filter = to_query_filter(filters);

        let started = Instant::now();
        let jobs = self.listings.list_approved_jobs(&query_filter).await?;
        histogram!(METRIC_LISTING_QUERY_MS, "query" => "approved_jobs")
            .record(started.elapsed().as_secs_f64() * 1000.0);

        let cards: Vec<JobCard> = jobs.iter().map(build_job_card).collect();
        Ok(ResultsView {
            job_count: cards.len(),
            has_results: !cards.is_empty(),
            jobs: cards,
        })
    }
}

pub fn to_query_filter(filters: &FilterState) -> JobQueryFilter {
    let search_terms = filters
        .query
        .as_deref()
        .map(|query| query.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();

    JobQueryFilter {
        search_terms,
        job_type: filters.job_type.clone(),
        location: filters.location.clone(),
        location_type: filters.remote_only.then_some(LocationType::Remote),
    }
}

fn build_job_card(job: &JobRecord) -> JobCard {
    let date = job.created_at.date();
    JobCard {
        slug: job.slug.clone(),
        title: job.title.clone(),
        company_name: job.company_name.clone(),
        job_type: job.job_type.clone(),
        location_label: location_label(job),
        salary: format_salary(job.salary),
        iso_date: date.to_string(),
        posted: format!("{} {}, {}", date.month(), date.day(), date.year()),
    }
}

fn location_label(job: &JobRecord) -> String {
    match job.location.as_deref().map(str::trim) {
        Some(location) if !location.is_empty() => {
            if job.location_type == LocationType::OnSite.as_str() {
                location.to_string()
            } else {
                format!("{location} ({})", job.location_type)
            }
        }
        _ => WORLDWIDE_LABEL.to_string(),
    }
}

/// Dollar amount with thousands separators, e.g. `$120,000`.
pub fn format_salary(amount: i32) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if amount < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
