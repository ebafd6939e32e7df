//! Filter codec: converts between URL query parameters / form fields and typed filters.
//!
//! Incoming query strings are decoded leniently into a [`FilterState`]. Form submissions go
//! through [`validate_and_encode`], which checks the input against the filter schema and
//! produces the canonical [`RawFilterInput`] used to build the redirect URL.

use thiserror::Error;
use url::form_urlencoded;

use crate::domain::types::JobType;

pub const MAX_QUERY_LENGTH: usize = 100;
pub const MAX_LOCATION_LENGTH: usize = 100;

const REMOTE_ENABLED: &str = "true";

/// String-keyed filter representation shared by query parameters and submitted forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFilterInput {
    pub q: Option<String>,
    /// Carried under the `type` key.
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub remote: Option<String>,
}

impl RawFilterInput {
    /// Parses a query string or form body. Unknown keys are ignored and the first
    /// occurrence of a repeated key wins.
    pub fn parse(input: &[u8]) -> Self {
        let mut raw = Self::default();
        for (key, value) in form_urlencoded::parse(input) {
            let slot = match key.as_ref() {
                "q" => &mut raw.q,
                "type" => &mut raw.job_type,
                "location" => &mut raw.location,
                "remote" => &mut raw.remote,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        raw
    }

    /// Present keys in their canonical order: `q`, `type`, `location`, `remote`.
    pub fn pairs(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        [
            ("q", self.q.as_deref()),
            ("type", self.job_type.as_deref()),
            ("location", self.location.as_deref()),
            ("remote", self.remote.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().next().is_none()
    }

    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.pairs() {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

/// Decoded search criteria for one page render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub query: Option<String>,
    /// Not checked against [`JobType`] here; only submissions are validated.
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub remote_only: bool,
}

impl FilterState {
    pub fn decode(raw: &RawFilterInput) -> Self {
        Self {
            query: normalize_filter_value(raw.q.as_deref()),
            job_type: normalize_filter_value(raw.job_type.as_deref()),
            location: normalize_filter_value(raw.location.as_deref()),
            remote_only: raw.remote.as_deref() == Some(REMOTE_ENABLED),
        }
    }

    pub fn to_raw(&self) -> RawFilterInput {
        RawFilterInput {
            q: self.query.clone(),
            job_type: self.job_type.clone(),
            location: self.location.clone(),
            remote: self.remote_only.then(|| REMOTE_ENABLED.to_string()),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.query.is_none()
            && self.job_type.is_none()
            && self.location.is_none()
            && !self.remote_only
    }
}

/// Filters that passed schema validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedFilters {
    pub query: Option<String>,
    pub job_type: Option<JobType>,
    pub location: Option<String>,
    pub remote: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterValidationError {
    #[error("unknown job type `{value}`")]
    UnknownJobType { value: String },
    #[error("`{field}` must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

impl FilterValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            FilterValidationError::UnknownJobType { .. } => "type",
            FilterValidationError::TooLong { field, .. } => field,
        }
    }
}

pub fn validate(raw: &RawFilterInput) -> Result<ValidatedFilters, FilterValidationError> {
    let query = bounded_text(raw.q.as_deref(), "q", MAX_QUERY_LENGTH)?;

    let job_type = match normalize_filter_value(raw.job_type.as_deref()) {
        Some(value) => Some(
            JobType::try_from(value.as_str())
                .map_err(|_| FilterValidationError::UnknownJobType { value })?,
        ),
        None => None,
    };

    let location = bounded_text(raw.location.as_deref(), "location", MAX_LOCATION_LENGTH)?;
    let remote = parse_checkbox_flag(raw.remote.as_deref());

    Ok(ValidatedFilters {
        query,
        job_type,
        location,
        remote,
    })
}

/// Canonical encoding: absent, false and empty values are omitted.
pub fn encode(filters: &ValidatedFilters) -> RawFilterInput {
    RawFilterInput {
        q: filters.query.clone(),
        job_type: filters.job_type.map(|job_type| job_type.as_str().to_string()),
        location: filters.location.clone(),
        remote: filters.remote.then(|| REMOTE_ENABLED.to_string()),
    }
}

pub fn validate_and_encode(raw: &RawFilterInput) -> Result<RawFilterInput, FilterValidationError> {
    validate(raw).map(|filters| encode(&filters))
}

fn normalize_filter_value(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

fn bounded_text(
    value: Option<&str>,
    field: &'static str,
    max: usize,
) -> Result<Option<String>, FilterValidationError> {
    let Some(value) = normalize_filter_value(value) else {
        return Ok(None);
    };
    if value.chars().count() > max {
        return Err(FilterValidationError::TooLong { field, max });
    }
    Ok(Some(value))
}

/// Checkbox presence convention: any non-blank value ticks the box unless it is an
/// explicit `false`, `off` or `0`.
pub fn parse_checkbox_flag(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") => false,
        Some(value) => !["false", "off", "0"]
            .iter()
            .any(|negative| value.eq_ignore_ascii_case(negative)),
    }
}
