use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode, header},
};
use devjobs::application::repos::{HealthCheck, JobQueryFilter, ListingRepository, RepoError};
use devjobs::domain::entities::JobRecord;
use devjobs::infra::http::{HttpState, REQUEST_ID_HEADER, build_router};
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;
use uuid::Uuid;

#[derive(Default)]
struct InMemoryListings {
    jobs: Vec<JobRecord>,
    healthy: bool,
}

#[async_trait]
impl ListingRepository for InMemoryListings {
    async fn find_distinct_locations(&self) -> Result<Vec<String>, RepoError> {
        let mut locations: Vec<String> = self
            .jobs
            .iter()
            .filter(|job| job.approved)
            .filter_map(|job| job.location.clone())
            .collect();
        locations.sort();
        locations.dedup();
        Ok(locations)
    }

    async fn list_approved_jobs(
        &self,
        filter: &JobQueryFilter,
    ) -> Result<Vec<JobRecord>, RepoError> {
        let mut jobs: Vec<JobRecord> = self
            .jobs
            .iter()
            .filter(|job| job.approved)
            .filter(|job| {
                filter.search_terms.iter().all(|term| {
                    let term = term.to_lowercase();
                    [
                        Some(job.title.as_str()),
                        Some(job.company_name.as_str()),
                        Some(job.job_type.as_str()),
                        Some(job.location_type.as_str()),
                        job.location.as_deref(),
                    ]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(&term))
                })
            })
            .filter(|job| {
                filter
                    .job_type
                    .as_deref()
                    .is_none_or(|value| job.job_type == value)
            })
            .filter(|job| {
                filter
                    .location
                    .as_deref()
                    .is_none_or(|value| job.location.as_deref() == Some(value))
            })
            .filter(|job| {
                filter
                    .location_type
                    .is_none_or(|value| job.location_type == value.as_str())
            })
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }
}

#[async_trait]
impl HealthCheck for InMemoryListings {
    async fn health_check(&self) -> Result<(), RepoError> {
        if self.healthy {
            Ok(())
        } else {
            Err(RepoError::Timeout)
        }
    }
}

fn job(
    slug: &str,
    title: &str,
    job_type: &str,
    location_type: &str,
    location: Option<&str>,
    approved: bool,
    age_days: i64,
) -> JobRecord {
    let created_at = OffsetDateTime::now_utc() - Duration::days(age_days);
    JobRecord {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        title: title.to_string(),
        job_type: job_type.to_string(),
        location_type: location_type.to_string(),
        location: location.map(str::to_string),
        company_name: "Acme".to_string(),
        company_logo_url: None,
        application_email: Some("jobs@acme.test".to_string()),
        application_url: None,
        description: None,
        salary: 100_000,
        approved,
        created_at,
        updated_at: created_at,
    }
}

fn router_with(listings: InMemoryListings) -> Router {
    let listings = Arc::new(listings);
    let repo: Arc<dyn ListingRepository> = listings.clone();
    let health: Arc<dyn HealthCheck> = listings;
    build_router(HttpState::new(repo, health))
}

fn seeded_router() -> Router {
    router_with(InMemoryListings {
        jobs: vec![
            job(
                "backend-berlin",
                "Backend Engineer",
                "Full-time",
                "On-site",
                Some("Berlin"),
                true,
                3,
            ),
            job(
                "backend-remote",
                "Backend Engineer",
                "Contract",
                "Remote",
                None,
                true,
                1,
            ),
            job(
                "frontend-lisbon",
                "Frontend Developer",
                "Part-time",
                "Hybrid",
                Some("Lisbon"),
                true,
                2,
            ),
            job(
                "hidden-paris",
                "Backend Engineer",
                "Full-time",
                "On-site",
                Some("Paris"),
                false,
                0,
            ),
        ],
        healthy: true,
    })
}

fn form_post(body: &str) -> Request<Body> {
    Request::post("/filter")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

#[tokio::test]
async fn valid_submission_redirects_with_encoded_filters() {
    let response = seeded_router()
        .oneshot(form_post(
            "q=Backend+Engineer&type=&location=&remote=on",
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/?q=Backend+Engineer&remote=true"
    );
}

#[tokio::test]
async fn empty_submission_redirects_to_unfiltered_listing() {
    let response = seeded_router()
        .oneshot(form_post(""))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/"
    );
}

#[tokio::test]
async fn unknown_job_type_is_rejected_and_page_rerendered() {
    let response = seeded_router()
        .oneshot(form_post("q=rust&type=Gig"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.headers().get(header::LOCATION).is_none());

    let html = body_text(response).await;
    assert!(html.contains("unknown job type"));
    assert!(html.contains(r#"value="rust""#));
}

#[tokio::test]
async fn any_present_remote_value_enables_remote_only() {
    for body in ["remote=yes", "remote=on", "remote=true"] {
        let response = seeded_router()
            .oneshot(form_post(body))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{body}");
        assert_eq!(
            response.headers().get(header::LOCATION).expect("location"),
            "/?remote=true"
        );
    }
}

#[tokio::test]
async fn rejected_submission_keeps_remote_checkbox_ticked() {
    let response = seeded_router()
        .oneshot(form_post("type=Gig&remote=on"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains(r#"type="checkbox" value="true" checked"#));
}

#[tokio::test]
async fn repeated_form_fields_keep_the_first_value() {
    let response = seeded_router()
        .oneshot(form_post("q=Backend&q=Frontend"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/?q=Backend"
    );
}

#[tokio::test]
async fn repeated_query_parameters_keep_the_first_value() {
    let response = seeded_router()
        .oneshot(
            Request::get("/?q=Frontend&q=Backend")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"value="Frontend""#));
    assert!(html.contains("job-frontend-lisbon"));
    assert!(!html.contains("job-backend-remote"));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let response = seeded_router()
        .oneshot(Request::get("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn index_lists_approved_locations_only() {
    let response = seeded_router()
        .oneshot(Request::get("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;

    assert!(html.contains(r#"<option value="Berlin">Berlin</option>"#));
    assert!(html.contains(r#"<option value="Lisbon">Lisbon</option>"#));
    assert!(!html.contains("Paris"));
    assert!(html.contains("3 matching jobs"));
}

#[tokio::test]
async fn index_applies_filters_from_query_string() {
    let response = seeded_router()
        .oneshot(
            Request::get("/?q=Backend+Engineer&remote=true")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;

    assert!(html.contains("job-backend-remote"));
    assert!(!html.contains("job-backend-berlin"));
    assert!(!html.contains("job-frontend-lisbon"));
    assert!(html.contains(r#"value="Backend Engineer""#));
    assert!(html.contains(r#"type="checkbox" value="true" checked"#));
}

#[tokio::test]
async fn index_preselects_type_and_location() {
    let response = seeded_router()
        .oneshot(
            Request::get("/?type=Full-time&location=Berlin")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    let html = body_text(response).await;
    assert!(html.contains(r#"<option value="Full-time" selected>Full-time</option>"#));
    assert!(html.contains(r#"<option value="Berlin" selected>Berlin</option>"#));
    assert!(html.contains("job-backend-berlin"));
    assert!(!html.contains("job-backend-remote"));
}

#[tokio::test]
async fn empty_store_renders_empty_state() {
    let response = router_with(InMemoryListings {
        healthy: true,
        ..Default::default()
    })
    .oneshot(Request::get("/").body(Body::empty()).expect("request"))
    .await
    .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("No jobs found"));
    assert!(html.contains("All Locations"));
}

#[tokio::test]
async fn db_health_reports_store_state() {
    let healthy = seeded_router()
        .oneshot(
            Request::get("/_health/db")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(healthy.status(), StatusCode::NO_CONTENT);

    let unhealthy = router_with(InMemoryListings::default())
        .oneshot(
            Request::get("/_health/db")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(unhealthy.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn unknown_route_renders_not_found_page() {
    let response = seeded_router()
        .oneshot(Request::get("/nope").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
