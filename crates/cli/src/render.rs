use civic_core::config::DashboardConfig;
use civic_core::projections::{
    self, CategoryCount, DateCount, MapMarker, SeverityCount, StatusCount, Summary, TrendPoint,
};
use civic_core::style::{category_color, hex_to_rgb};
use civic_core::{Issue, Status};
use owo_colors::OwoColorize;
use serde::Serialize;

const EMPTY_VIEW: &str = "No issues match the current filters.";

#[derive(Serialize)]
pub struct AdminView<'a> {
    pub name: &'a str,
    pub location: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView<'a> {
    pub admin: AdminView<'a>,
    pub summary: Summary,
    pub resolution_trend: Vec<TrendPoint>,
    pub top_upvoted: Vec<&'a Issue>,
}

impl<'a> DashboardView<'a> {
    pub fn new(config: &'a DashboardConfig, issues: &'a [Issue]) -> Self {
        Self {
            admin: AdminView {
                name: &config.admin.name,
                location: &config.admin.location,
            },
            summary: projections::summary(issues),
            resolution_trend: projections::resolution_trend(issues),
            top_upvoted: projections::top_upvoted(issues, config.view.top_n),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportsView {
    pub summary: Summary,
    pub by_category: Vec<CategoryCount>,
    pub by_severity: Vec<SeverityCount>,
    pub by_date: Vec<DateCount>,
    pub by_status: Vec<StatusCount>,
}

impl ReportsView {
    pub fn new(issues: &[Issue]) -> Self {
        Self {
            summary: projections::summary(issues),
            by_category: projections::category_counts(issues),
            by_severity: projections::severity_counts(issues),
            by_date: projections::reported_by_date(issues),
            by_status: projections::status_counts(issues),
        }
    }
}

#[derive(Serialize)]
pub struct MapCenter {
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
}

#[derive(Serialize)]
pub struct MapView {
    pub center: MapCenter,
    pub markers: Vec<MapMarker>,
}

impl MapView {
    pub fn new(config: &DashboardConfig, issues: &[Issue]) -> Self {
        Self {
            center: MapCenter {
                lat: config.map.center_lat,
                lng: config.map.center_lng,
                zoom: config.map.zoom,
            },
            markers: projections::map_markers(issues),
        }
    }
}

fn paint(text: &str, hex: &str, color: bool) -> String {
    match hex_to_rgb(hex) {
        Some((r, g, b)) if color => text.truecolor(r, g, b).to_string(),
        _ => text.to_string(),
    }
}

pub fn paint_status(status: Status, padded: &str, color: bool) -> String {
    paint(padded, status.style().color, color)
}

/// Joins rendered lines, ending with a newline.
fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn issue_table(issues: &[&Issue], color: bool) -> String {
    if issues.is_empty() {
        return format!("{EMPTY_VIEW}\n");
    }

    let headers = ["ID", "Title", "Category", "Status", "Severity", "Upvotes", "Reported"];
    let rows: Vec<[String; 7]> = issues
        .iter()
        .map(|issue| {
            [
                issue.id.clone(),
                issue.title.clone(),
                issue.category.clone(),
                issue.status.to_string(),
                issue.severity.to_string(),
                issue.upvotes.to_string(),
                issue.reported_at.clone(),
            ]
        })
        .collect();

    let mut widths = headers.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header_line: Vec<String> = headers
        .iter()
        .zip(widths)
        .map(|(header, width)| format!("{header:<width$}"))
        .collect();
    let mut lines = vec![header_line.join("  ").trim_end().to_string()];

    for (row, issue) in rows.iter().zip(issues) {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(column, (cell, width))| {
                let padded = format!("{cell:<width$}");
                if column == 3 {
                    paint_status(issue.status, &padded, color)
                } else {
                    padded
                }
            })
            .collect();
        lines.push(cells.join("  ").trim_end().to_string());
    }
    finish(lines)
}

pub fn issue_detail(issue: &Issue, color: bool) -> String {
    let description = if issue.description.trim().is_empty() {
        "-"
    } else {
        issue.description.as_str()
    };
    finish(vec![
        format!(
            "{} ({}) [{}]",
            issue.title,
            issue.id,
            paint_status(issue.status, issue.status.as_str(), color)
        ),
        format!("Category:    {}", issue.category),
        format!("Severity:    {}", issue.severity),
        format!("Upvotes:     {}", issue.upvotes),
        format!("Reported At: {}", issue.reported_at),
        format!("Location:    {}, {}", issue.lat, issue.lng),
        format!("Description: {description}"),
    ])
}

fn summary_cards(lines: &mut Vec<String>, summary: &Summary) {
    lines.push(format!("Total Issues:    {}", summary.total));
    lines.push(format!("Resolved:        {}", summary.resolved));
    lines.push(format!("Unresolved:      {}", summary.unresolved));
    lines.push(format!("In Progress:     {}", summary.in_progress));
    lines.push(format!("Resolution Rate: {}%", summary.resolution_rate));
}

pub fn dashboard_text(view: &DashboardView<'_>) -> String {
    let mut lines = vec![
        format!("Admin Panel - {} ({})", view.admin.name, view.admin.location),
        String::new(),
    ];
    summary_cards(&mut lines, &view.summary);

    lines.push(String::new());
    lines.push("Resolution Trend".to_string());
    lines.push(format!("{:<12}  {:>8}  {:>8}  {:>5}", "Date", "Reported", "Resolved", "Rate"));
    for point in &view.resolution_trend {
        lines.push(format!(
            "{:<12}  {:>8}  {:>8}  {:>4}%",
            point.date, point.reported, point.resolved, point.resolution_rate
        ));
    }

    lines.push(String::new());
    lines.push("Top Upvoted Issues".to_string());
    for issue in &view.top_upvoted {
        lines.push(format!("{:>5}  {} ({})", issue.upvotes, issue.title, issue.id));
    }
    finish(lines)
}

pub fn reports_text(view: &ReportsView, color: bool) -> String {
    let mut lines = vec!["Reports & Analytics".to_string(), String::new()];
    summary_cards(&mut lines, &view.summary);

    lines.push(String::new());
    lines.push("Issues by Category".to_string());
    for (index, entry) in view.by_category.iter().enumerate() {
        let name = paint(&entry.category, category_color(index), color);
        lines.push(format!("  {name}: {}", entry.count));
    }

    lines.push(String::new());
    lines.push("Issues by Severity".to_string());
    for entry in &view.by_severity {
        let name = paint(entry.severity.as_str(), entry.severity.style().gradient.0, color);
        lines.push(format!("  {name}: {}", entry.count));
    }

    lines.push(String::new());
    lines.push("Issues Reported Over Time".to_string());
    for entry in &view.by_date {
        lines.push(format!("  {}: {}", entry.date, entry.count));
    }

    lines.push(String::new());
    lines.push("Issues by Status".to_string());
    for entry in &view.by_status {
        let name = paint_status(entry.status, entry.status.as_str(), color);
        lines.push(format!("  {name}: {}", entry.count));
    }
    finish(lines)
}

pub fn map_text(view: &MapView, color: bool) -> String {
    let mut lines = vec![format!(
        "Map centre {:.4}, {:.4} (zoom {})",
        view.center.lat, view.center.lng, view.center.zoom
    )];
    for marker in &view.markers {
        let dot = paint("●", marker.color, color);
        lines.push(format!(
            "{dot} {:<10} {:>9.4} {:>9.4}  {} [{}] {}",
            marker.id, marker.lat, marker.lng, marker.title, marker.category, marker.status
        ));
    }
    finish(lines)
}
