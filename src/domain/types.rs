//! Listing enumerations shared by the filter codec and the store.

use std::fmt;

/// Employment types a listing can be published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Temporary,
    Volunteer,
    Internship,
}

impl JobType {
    pub const ALL: [JobType; 6] = [
        JobType::FullTime,
        JobType::PartTime,
        JobType::Contract,
        JobType::Temporary,
        JobType::Volunteer,
        JobType::Internship,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Temporary => "Temporary",
            JobType::Volunteer => "Volunteer",
            JobType::Internship => "Internship",
        }
    }
}

impl TryFrom<&str> for JobType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        JobType::ALL
            .into_iter()
            .find(|job_type| job_type.as_str() == value)
            .ok_or(())
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the work happens. Remote listings usually carry no `location`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationType {
    Remote,
    OnSite,
    Hybrid,
}

impl LocationType {
    pub fn as_str(self) -> &'static str {
        match self {
            LocationType::Remote => "Remote",
            LocationType::OnSite => "On-site",
            LocationType::Hybrid => "Hybrid",
        }
    }
}

impl TryFrom<&str> for LocationType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Remote" => Ok(LocationType::Remote),
            "On-site" => Ok(LocationType::OnSite),
            "Hybrid" => Ok(LocationType::Hybrid),
            _ => Err(()),
        }
    }
}
