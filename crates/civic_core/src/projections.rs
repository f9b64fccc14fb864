//! Read-only aggregates over the issue collection: the figures behind the
//! dashboard cards, the report charts and the map.

use crate::dates;
use crate::schema::{Issue, Severity, Status};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub in_progress: usize,
    pub resolution_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: Status,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeverityCount {
    pub severity: Severity,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateCount {
    pub date: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: String,
    pub reported: usize,
    pub resolved: usize,
    pub resolution_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    pub id: String,
    pub title: String,
    pub category: String,
    pub status: Status,
    pub reported_at: String,
    pub lat: f64,
    pub lng: f64,
    pub color: &'static str,
}

/// `part / whole` as a whole percentage, half rounding up. Zero when `whole` is zero.
pub fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let rounded = (part * 100 + whole / 2) / whole;
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

pub fn count_with_status(issues: &[Issue], status: Status) -> usize {
    issues.iter().filter(|issue| issue.status == status).count()
}

pub fn summary(issues: &[Issue]) -> Summary {
    let resolved = count_with_status(issues, Status::Resolved);
    Summary {
        total: issues.len(),
        resolved,
        unresolved: count_with_status(issues, Status::Unresolved),
        in_progress: count_with_status(issues, Status::InProgress),
        resolution_rate: percent(resolved, issues.len()),
    }
}

/// One entry per status in tab order, zero counts included.
pub fn status_counts(issues: &[Issue]) -> Vec<StatusCount> {
    Status::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: count_with_status(issues, status),
        })
        .collect()
}

/// Categories in order of first appearance.
pub fn category_counts(issues: &[Issue]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    for issue in issues {
        match counts.iter_mut().find(|entry| entry.category == issue.category) {
            Some(entry) => entry.count += 1,
            None => counts.push(CategoryCount {
                category: issue.category.clone(),
                count: 1,
            }),
        }
    }
    counts
}

/// Severities that occur, highest rank first.
pub fn severity_counts(issues: &[Issue]) -> Vec<SeverityCount> {
    Severity::BY_RANK
        .into_iter()
        .map(|severity| SeverityCount {
            severity,
            count: issues.iter().filter(|issue| issue.severity == severity).count(),
        })
        .filter(|entry| entry.count > 0)
        .collect()
}

/// Counts per exact `reported_at` value, oldest first.
pub fn reported_by_date(issues: &[Issue]) -> Vec<DateCount> {
    resolution_trend(issues)
        .into_iter()
        .map(|point| DateCount {
            date: point.date,
            count: point.reported,
        })
        .collect()
}

/// Reported and resolved counts per exact `reported_at` value, oldest first.
pub fn resolution_trend(issues: &[Issue]) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = Vec::new();
    for issue in issues {
        let resolved = usize::from(issue.status == Status::Resolved);
        match points.iter_mut().find(|point| point.date == issue.reported_at) {
            Some(point) => {
                point.reported += 1;
                point.resolved += resolved;
            }
            None => points.push(TrendPoint {
                date: issue.reported_at.clone(),
                reported: 1,
                resolved,
                resolution_rate: 0,
            }),
        }
    }
    for point in &mut points {
        point.resolution_rate = percent(point.resolved, point.reported);
    }
    points.sort_by(|a, b| {
        dates::oldest_first(
            dates::parse_reported_at(&a.date),
            dates::parse_reported_at(&b.date),
        )
        .then_with(|| a.date.cmp(&b.date))
    });
    points
}

/// The `n` most upvoted issues; equal counts keep collection order.
pub fn top_upvoted(issues: &[Issue], n: usize) -> Vec<&Issue> {
    let mut ranked: Vec<&Issue> = issues.iter().collect();
    ranked.sort_by(|a, b| b.upvotes.cmp(&a.upvotes));
    ranked.truncate(n);
    ranked
}

pub fn map_markers(issues: &[Issue]) -> Vec<MapMarker> {
    issues
        .iter()
        .map(|issue| MapMarker {
            id: issue.id.clone(),
            title: issue.title.clone(),
            category: issue.category.clone(),
            status: issue.status,
            reported_at: issue.reported_at.clone(),
            lat: issue.lat,
            lng: issue.lng,
            color: issue.status.style().color,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn issue(
        id: &str,
        category: &str,
        severity: Severity,
        status: Status,
        upvotes: u32,
        date: &str,
    ) -> Issue {
        Issue {
            id: id.to_string(),
            title: id.to_string(),
            category: category.to_string(),
            severity,
            status,
            upvotes,
            reported_at: date.to_string(),
            description: String::new(),
            lat: 18.5,
            lng: 73.8,
        }
    }

    fn sample() -> Vec<Issue> {
        vec![
            issue("1", "Roads", Severity::High, Status::Resolved, 3, "2024-01-02"),
            issue("2", "Water Supply", Severity::Low, Status::Unresolved, 8, "2024-01-01"),
            issue("3", "Roads", Severity::Medium, Status::InProgress, 8, "2024-01-02"),
            issue("4", "Electricity", Severity::High, Status::Unresolved, 1, "2024-01-02"),
            issue("5", "Water Supply", Severity::High, Status::Resolved, 0, "2024-01-01"),
            issue("6", "Sanitation", Severity::Low, Status::Resolved, 12, "2023-12-30"),
        ]
    }

    #[test]
    fn test_percent_rounds_half_up() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 2), 50);
        assert_eq!(percent(1, 8), 13); // 12.5
        assert_eq!(percent(0, 0), 0);
    }

    #[test]
    fn test_summary() {
        let summary = summary(&sample());
        assert_eq!(
            summary,
            Summary {
                total: 6,
                resolved: 3,
                unresolved: 2,
                in_progress: 1,
                resolution_rate: 50,
            }
        );
    }

    #[test]
    fn test_status_counts_sum_to_total() {
        let issues = sample();
        let counts = status_counts(&issues);
        assert_eq!(counts.len(), 3);
        assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), issues.len());
        assert_eq!(counts[0].status, Status::Unresolved);
    }

    #[test]
    fn test_status_counts_keep_empty_statuses() {
        let issues = vec![issue("1", "Roads", Severity::Low, Status::Resolved, 0, "2024-01-01")];
        let counts = status_counts(&issues);
        assert_eq!(counts[0].count, 0);
        assert_eq!(counts[1].count, 0);
        assert_eq!(counts[2].count, 1);
    }

    #[test]
    fn test_category_counts_first_appearance_order() {
        let counts = category_counts(&sample());
        let names: Vec<&str> = counts.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Roads", "Water Supply", "Electricity", "Sanitation"]);
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].count, 2);
    }

    #[test]
    fn test_severity_counts_by_rank() {
        let counts = severity_counts(&sample());
        assert_eq!(
            counts,
            vec![
                SeverityCount { severity: Severity::High, count: 3 },
                SeverityCount { severity: Severity::Medium, count: 1 },
                SeverityCount { severity: Severity::Low, count: 2 },
            ]
        );
    }

    #[test]
    fn test_severity_counts_skip_absent_levels() {
        let issues = vec![issue("1", "Roads", Severity::Low, Status::Resolved, 0, "2024-01-01")];
        assert_eq!(severity_counts(&issues).len(), 1);
    }

    #[test]
    fn test_resolution_trend() {
        let trend = resolution_trend(&sample());
        let dates: Vec<&str> = trend.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2023-12-30", "2024-01-01", "2024-01-02"]);

        assert_eq!(trend[1].reported, 2);
        assert_eq!(trend[1].resolved, 1);
        assert_eq!(trend[1].resolution_rate, 50);

        assert_eq!(trend[2].reported, 3);
        assert_eq!(trend[2].resolved, 1);
        assert_eq!(trend[2].resolution_rate, 33);
    }

    #[test]
    fn test_reported_by_date_sums_to_total() {
        let issues = sample();
        let counts = reported_by_date(&issues);
        assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), issues.len());
    }

    #[test]
    fn test_top_upvoted_stable_and_truncated() {
        let issues = sample();
        let top: Vec<&str> = top_upvoted(&issues, 3).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(top, vec!["6", "2", "3"]);
        assert_eq!(top_upvoted(&issues, 50).len(), issues.len());
    }

    #[test]
    fn test_map_markers_carry_status_color() {
        let markers = map_markers(&sample());
        assert_eq!(markers.len(), 6);
        assert_eq!(markers[0].color, Status::Resolved.style().color);
        assert_eq!(markers[1].color, Status::Unresolved.style().color);
    }
}
