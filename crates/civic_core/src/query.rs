//! Filter/sort engine behind the issue management view.
//!
//! Filters compose conjunctively in a fixed order (status tab, category,
//! severity, search text) and the sort is applied last. Sorting is stable, so
//! ties keep the order of the input collection. The collection itself is never
//! reordered; [`query`] returns borrowed views.

use crate::dates;
use crate::error::ParseError;
use crate::schema::{Issue, Severity, Status};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const ALL_SENTINEL: &str = "all";

/// Equality filter that can be switched off with the `"all"` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Filter<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(wanted) => wanted == value,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str(ALL_SENTINEL),
            Filter::Only(value) => value.fmt(f),
        }
    }
}

impl<T: FromStr> FromStr for Filter<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(ALL_SENTINEL) {
            return Ok(Filter::All);
        }
        s.parse().map(Filter::Only)
    }
}

impl<T: fmt::Display> Serialize for Filter<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, T> Deserialize<'de> for Filter<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl<T> JsonSchema for Filter<T> {
    fn is_referenceable() -> bool {
        false
    }

    fn schema_name() -> String {
        "Filter".to_string()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(generator)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Severity,
    Upvotes,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Date, SortKey::Severity, SortKey::Upvotes];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Severity => "severity",
            SortKey::Upvotes => "upvotes",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "date" | "newest" => Ok(SortKey::Date),
            "severity" => Ok(SortKey::Severity),
            "upvotes" => Ok(SortKey::Upvotes),
            _ => Err(ParseError::SortKey(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryConfig {
    pub status_tab: Status,
    pub category: Filter<String>,
    pub severity: Filter<Severity>,
    pub search_text: String,
    pub sort_key: SortKey,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            status_tab: Status::Unresolved,
            category: Filter::All,
            severity: Filter::All,
            search_text: String::new(),
            sort_key: SortKey::Date,
        }
    }
}

impl QueryConfig {
    pub fn for_tab(status_tab: Status) -> Self {
        Self {
            status_tab,
            ..Self::default()
        }
    }
}

/// Ordered, filtered view of `issues` for `config`.
pub fn query<'a>(issues: &'a [Issue], config: &QueryConfig) -> Vec<&'a Issue> {
    let needle = config.search_text.to_lowercase();

    let mut matched: Vec<&Issue> = issues
        .iter()
        .filter(|issue| issue.status == config.status_tab)
        .filter(|issue| config.category.admits(&issue.category))
        .filter(|issue| config.severity.admits(&issue.severity))
        .filter(|issue| matches_search(issue, &needle))
        .collect();

    sort_issues(&mut matched, config.sort_key);
    debug!(
        tab = %config.status_tab,
        category = %config.category,
        severity = %config.severity,
        sort = %config.sort_key,
        matched = matched.len(),
        "issue query"
    );
    matched
}

/// `needle` must already be lower-cased.
fn matches_search(issue: &Issue, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    issue.title.to_lowercase().contains(needle)
        || issue.id.to_lowercase().contains(needle)
        || issue.category.to_lowercase().contains(needle)
}

pub fn sort_issues(issues: &mut [&Issue], key: SortKey) {
    match key {
        SortKey::Severity => issues.sort_by(|a, b| b.severity.rank().cmp(&a.severity.rank())),
        SortKey::Upvotes => issues.sort_by(|a, b| b.upvotes.cmp(&a.upvotes)),
        SortKey::Date => {
            issues.sort_by(|a, b| dates::newest_first(a.reported_on(), b.reported_on()))
        }
    }
}

/// Sets the status of the issue with `id`. Returns `false` and leaves the
/// collection untouched when no issue has that id.
pub fn set_status(issues: &mut [Issue], id: &str, status: Status) -> bool {
    match issues.iter_mut().find(|issue| issue.id == id) {
        Some(issue) => {
            debug!(id, from = %issue.status, to = %status, "status change");
            issue.status = status;
            true
        }
        None => {
            debug!(id, "status change ignored: unknown issue id");
            false
        }
    }
}
