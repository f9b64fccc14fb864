use crate::error::ParseError;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Categories offered by the category filter. The field itself is open-ended.
pub const KNOWN_CATEGORIES: &[&str] = &["Roads", "Electricity", "Sanitation", "Water Supply"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Unresolved,
    InProgress,
    Resolved,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Unresolved, Status::InProgress, Status::Resolved];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Unresolved => "unresolved",
            Status::InProgress => "in-progress",
            Status::Resolved => "resolved",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unresolved" => Ok(Status::Unresolved),
            "in-progress" | "in_progress" | "inprogress" => Ok(Status::InProgress),
            "resolved" => Ok(Status::Resolved),
            _ => Err(ParseError::Status(s.to_string())),
        }
    }
}

/// Serialized as `Low`/`Medium`/`High`; any casing is accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Highest rank first.
    pub const BY_RANK: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub fn rank(self) -> u8 {
        match self {
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            _ => Err(ParseError::Severity(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,             // stable, unique across the collection
    pub title: String,
    pub category: String,       // e.g. "Roads", "Water Supply"
    pub severity: Severity,
    pub status: Status,
    #[serde(default)]
    pub upvotes: u32,
    pub reported_at: String,    // "YYYY-MM-DD" or RFC 3339
    #[serde(default)]
    pub description: String,
    pub lat: f64,
    pub lng: f64,
}

impl Issue {
    /// Parsed `reported_at`, `None` when the value is not a recognised date.
    pub fn reported_on(&self) -> Option<time::OffsetDateTime> {
        crate::dates::parse_reported_at(&self.reported_at)
    }
}
