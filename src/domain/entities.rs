use time::OffsetDateTime;
use uuid::Uuid;

/// A job listing as persisted in the `jobs` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub job_type: String,
    pub location_type: String,
    pub location: Option<String>,
    pub company_name: String,
    pub company_logo_url: Option<String>,
    pub application_email: Option<String>,
    pub application_url: Option<String>,
    pub description: Option<String>,
    /// Annual salary in whole currency units.
    pub salary: i32,
    pub approved: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
