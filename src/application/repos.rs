//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::JobRecord;
use crate::domain::types::LocationType;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Store-level criteria for the approved-listings query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobQueryFilter {
    /// Every term must match title, company, type, location type or location.
    pub search_terms: Vec<String>,
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub location_type: Option<LocationType>,
}

#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Distinct non-null locations among approved listings.
    async fn find_distinct_locations(&self) -> Result<Vec<String>, RepoError>;

    /// Approved listings matching `filter`, newest first.
    async fn list_approved_jobs(&self, filter: &JobQueryFilter)
    -> Result<Vec<JobRecord>, RepoError>;
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn health_check(&self) -> Result<(), RepoError>;
}
