//! Postgres-backed repository implementations.

mod listings;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{
    Postgres, QueryBuilder,
    postgres::{PgPool, PgPoolOptions},
    query,
};

use crate::application::repos::{HealthCheck, JobQueryFilter, RepoError};

/// Columns a free-text search word may match.
const SEARCH_COLUMNS: [&str; 5] = [
    "j.title",
    "j.company_name",
    "j.job_type",
    "j.location_type",
    "COALESCE(j.location, '')",
];

/// `%term%`, with `%`, `_` and `\` in `term` matched literally.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    fn apply_job_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q JobQueryFilter) {
        for term in &filter.search_terms {
            let pattern = contains_pattern(term);
            qb.push(" AND (");
            for (index, column) in SEARCH_COLUMNS.iter().enumerate() {
                if index > 0 {
                    qb.push(" OR ");
                }
                qb.push(column);
                qb.push(" ILIKE ");
                qb.push_bind(pattern.clone());
                qb.push(r" ESCAPE '\'");
            }
            qb.push(")");
        }

        if let Some(job_type) = filter.job_type.as_ref() {
            qb.push(" AND j.job_type = ");
            qb.push_bind(job_type);
        }

        if let Some(location) = filter.location.as_ref() {
            qb.push(" AND j.location = ");
            qb.push_bind(location);
        }

        if let Some(location_type) = filter.location_type {
            qb.push(" AND j.location_type = ");
            qb.push_bind(location_type.as_str());
        }
    }
}

#[async_trait]
impl HealthCheck for PostgresRepositories {
    async fn health_check(&self) -> Result<(), RepoError> {
        query("SELECT 1")
            .execute(self.pool())
            .await
            .map(|_| ())
            .map_err(map_sqlx_error)
    }
}
