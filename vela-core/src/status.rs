//! Status - Lifecycle status reported by a remote resource

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a remote resource.
///
/// Vendors report status as free-form strings in varying case ("running",
/// "Running", "RUNNING"). Parsing is case-insensitive, and values outside the
/// well-known set are kept verbatim in `Other`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Running,
    Initial,
    Deleting,
    Deleted,
    Failed,
    Other(String),
}

impl Status {
    /// All well-known statuses, in lifecycle order
    pub const KNOWN: [Status; 5] = [
        Status::Initial,
        Status::Running,
        Status::Deleting,
        Status::Deleted,
        Status::Failed,
    ];

    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "running" => Status::Running,
            "initial" => Status::Initial,
            "deleting" => Status::Deleting,
            "deleted" => Status::Deleted,
            "failed" => Status::Failed,
            _ => Status::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Running => "Running",
            Status::Initial => "Initial",
            Status::Deleting => "Deleting",
            Status::Deleted => "Deleted",
            Status::Failed => "Failed",
            Status::Other(s) => s,
        }
    }

    /// Case-insensitive comparison against another status
    pub fn matches(&self, other: &Status) -> bool {
        self.as_str().eq_ignore_ascii_case(other.as_str())
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Status::Deleted)
    }
}

impl PartialEq for Status {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

impl Eq for Status {}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Status::parse(s))
    }
}

impl From<&str> for Status {
    fn from(s: &str) -> Self {
        Status::parse(s)
    }
}

impl From<String> for Status {
    fn from(s: String) -> Self {
        Status::parse(&s)
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Status::parse("running"), Status::Running);
        assert_eq!(Status::parse("RUNNING"), Status::Running);
        assert_eq!(Status::parse(" Deleted "), Status::Deleted);
    }

    #[test]
    fn unknown_status_kept_verbatim() {
        let status = Status::parse("Scaling");
        assert_eq!(status, Status::Other("Scaling".to_string()));
        assert_eq!(status.to_string(), "Scaling");
    }

    #[test]
    fn other_status_matches_ignoring_case() {
        let a = Status::Other("updating".to_string());
        let b = Status::Other("Updating".to_string());
        assert!(a.matches(&b));
        assert!(!a.matches(&Status::Running));
    }

    #[test]
    fn string_conversion_round_trips() {
        assert_eq!(String::from(Status::Deleting), "Deleting");
        let status: Status = String::from("failed").into();
        assert!(matches!(status, Status::Failed));
    }
}
