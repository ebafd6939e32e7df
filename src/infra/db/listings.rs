use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{JobQueryFilter, ListingRepository, RepoError},
    domain::entities::JobRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

const JOB_COLUMNS: &str = "j.id, j.slug, j.title, j.job_type, j.location_type, j.location, \
    j.company_name, j.company_logo_url, j.application_email, j.application_url, \
    j.description, j.salary, j.approved, j.created_at, j.updated_at";

#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    slug: String,
    title: String,
    job_type: String,
    location_type: String,
    location: Option<String>,
    company_name: String,
    company_logo_url: Option<String>,
    application_email: Option<String>,
    application_url: Option<String>,
    description: Option<String>,
    salary: i32,
    approved: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<JobRow> for JobRecord {
    fn from(row: JobRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            title: row.title,
            job_type: row.job_type,
            location_type: row.location_type,
            location: row.location,
            company_name: row.company_name,
            company_logo_url: row.company_logo_url,
            application_email: row.application_email,
            application_url: row.application_url,
            description: row.description,
            salary: row.salary,
            approved: row.approved,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ListingRepository for PostgresRepositories {
    async fn find_distinct_locations(&self) -> Result<Vec<String>, RepoError> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT location
            FROM jobs
            WHERE approved = TRUE
              AND location IS NOT NULL
              AND btrim(location) <> ''
            ORDER BY location
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_approved_jobs(
        &self,
        filter: &JobQueryFilter,
    ) -> Result<Vec<JobRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(JOB_COLUMNS);
        qb.push(" FROM jobs j WHERE j.approved = TRUE");

        Self::apply_job_filter(&mut qb, filter);

        qb.push(" ORDER BY j.created_at DESC, j.id DESC");

        let rows = qb
            .build_query_as::<JobRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(JobRecord::from).collect())
    }
}
