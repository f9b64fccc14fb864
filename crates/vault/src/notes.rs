use anyhow::{Context, Result};
use civic_core::config::DashboardConfig;
use civic_core::projections;
use civic_core::{Issue, Status};
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};

use crate::csv;

pub struct VaultPaths {
    pub root: PathBuf,
    pub index_dir: PathBuf,
    pub issues_dir: PathBuf,
    pub reports_dir: PathBuf,
}

impl VaultPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            index_dir: root.join("00_Index"),
            issues_dir: root.join("Issues"),
            reports_dir: root.join("Reports"),
            root,
        }
    }

    pub fn ensure(&self) -> Result<()> {
        for dir in [&self.index_dir, &self.issues_dir, &self.reports_dir] {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn issue_moc(&self) -> PathBuf {
        self.index_dir.join("MOC - Issues.md")
    }

    pub fn dashboard(&self) -> PathBuf {
        self.index_dir.join("Dashboard.md")
    }

    pub fn summary(&self) -> PathBuf {
        self.reports_dir.join("Summary.md")
    }

    pub fn csv(&self) -> PathBuf {
        self.root.join("issues.csv")
    }

    pub fn issue_note(&self, id: &str) -> PathBuf {
        self.issues_dir.join(format!("{}.md", note_file_stem(id)))
    }
}

/// What an export wrote, for the caller to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub root: PathBuf,
    pub issue_notes: usize,
    pub files: Vec<PathBuf>,
}

pub fn build_vault(
    issues: &[Issue],
    config: &DashboardConfig,
    vault_root: &Path,
) -> Result<ExportSummary> {
    build_vault_at(issues, config, vault_root, OffsetDateTime::now_utc())
}

pub fn build_vault_at(
    issues: &[Issue],
    config: &DashboardConfig,
    vault_root: &Path,
    generated_at: OffsetDateTime,
) -> Result<ExportSummary> {
    let paths = VaultPaths::new(vault_root);
    paths.ensure()?;
    let stamp = generated_at.format(&Rfc3339)?;
    let mut files = Vec::new();

    // 1) One note per issue
    for issue in issues {
        let path = paths.issue_note(&issue.id);
        write_file(&path, &issue_note(issue, &stamp))?;
        debug!(id = %issue.id, path = %path.display(), "wrote issue note");
        files.push(path);
    }

    // 2) Issue MOC grouped by status
    let moc = paths.issue_moc();
    write_file(&moc, &issue_moc(issues, &stamp))?;
    files.push(moc);

    // 3) Dashboard
    let dashboard = paths.dashboard();
    write_file(&dashboard, &dashboard_note(issues, config, &stamp))?;
    files.push(dashboard);

    // 4) Report breakdowns
    let summary = paths.summary();
    write_file(&summary, &summary_note(issues, &stamp))?;
    files.push(summary);

    // 5) CSV
    let csv_path = paths.csv();
    write_file(&csv_path, &csv::issues_csv(issues))?;
    files.push(csv_path);

    info!(root = %paths.root.display(), files = files.len(), "vault export complete");
    Ok(ExportSummary {
        root: paths.root,
        issue_notes: issues.len(),
        files,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
}

fn generated_header(title: &str, stamp: &str) -> Vec<String> {
    vec![
        format!("# {title}"),
        String::new(),
        format!("This note is generated ({stamp}). Do not edit manually."),
        String::new(),
    ]
}

fn issue_note(issue: &Issue, stamp: &str) -> String {
    let mut md = String::new();
    md.push_str("---\n");
    md.push_str(&format!("id: {}\n", yaml_string(&issue.id)));
    md.push_str(&format!("title: {}\n", yaml_string(&issue.title)));
    md.push_str(&format!("category: {}\n", yaml_string(&issue.category)));
    md.push_str(&format!("severity: {}\n", issue.severity));
    md.push_str(&format!("status: {}\n", issue.status));
    md.push_str(&format!("upvotes: {}\n", issue.upvotes));
    md.push_str(&format!("reported_at: {}\n", yaml_string(&issue.reported_at)));
    md.push_str(&format!("lat: {}\n", issue.lat));
    md.push_str(&format!("lng: {}\n", issue.lng));
    md.push_str(&format!("generated_at: {stamp}\n"));
    md.push_str("---\n\n");

    md.push_str(&format!("# {} ({})\n\n", issue.title, issue.id));
    md.push_str(&format!("- Status: `{}`\n", issue.status.style().label));
    md.push_str(&format!("- Category: {}\n", issue.category));
    md.push_str(&format!("- Severity: {}\n", issue.severity));
    md.push_str(&format!("- Upvotes: {}\n", issue.upvotes));
    md.push_str(&format!("- Reported: `{}`\n", issue.reported_at));
    md.push_str(&format!("- Location: {}, {}\n\n", issue.lat, issue.lng));

    md.push_str("## Description\n");
    if issue.description.trim().is_empty() {
        md.push_str("_No description provided._\n");
    } else {
        md.push_str(&issue.description);
        md.push('\n');
    }
    md
}

fn issue_moc(issues: &[Issue], stamp: &str) -> String {
    let mut lines = generated_header("MOC - Issues", stamp);
    for status in Status::ALL {
        lines.push(format!("## {}", status.style().label));
        lines.push(String::new());
        let links: Vec<String> = issues
            .iter()
            .filter(|issue| issue.status == status)
            .map(|issue| {
                format!("- [[Issues/{}|{}]]", note_file_stem(&issue.id), link_label(&issue.title))
            })
            .collect();
        if links.is_empty() {
            lines.push("_No issues._".to_string());
        } else {
            lines.extend(links);
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

fn dashboard_note(issues: &[Issue], config: &DashboardConfig, stamp: &str) -> String {
    let mut lines = generated_header("Dashboard", stamp);
    lines.push(format!("Admin: {} ({})", config.admin.name, config.admin.location));
    lines.push(String::new());

    let summary = projections::summary(issues);
    lines.push("## Overview".to_string());
    lines.push(String::new());
    lines.push(format!("- Total Issues: {}", summary.total));
    lines.push(format!("- Resolved: {}", summary.resolved));
    lines.push(format!("- Unresolved: {}", summary.unresolved));
    lines.push(format!("- In Progress: {}", summary.in_progress));
    lines.push(format!("- Resolution Rate: {}%", summary.resolution_rate));
    lines.push(String::new());

    lines.push("## Resolution Trend".to_string());
    lines.push(String::new());
    lines.push("| Date | Reported | Resolved | Rate |".to_string());
    lines.push("|------|---------:|---------:|-----:|".to_string());
    for point in projections::resolution_trend(issues) {
        lines.push(format!(
            "| {} | {} | {} | {}% |",
            point.date, point.reported, point.resolved, point.resolution_rate
        ));
    }
    lines.push(String::new());

    lines.push("## Top Upvoted Issues".to_string());
    lines.push(String::new());
    let top = projections::top_upvoted(issues, config.view.top_n);
    if top.is_empty() {
        lines.push("_No issues._".to_string());
    }
    for issue in top {
        lines.push(format!(
            "- [[Issues/{}|{}]] ({} upvotes)",
            note_file_stem(&issue.id),
            link_label(&issue.title),
            issue.upvotes
        ));
    }
    lines.join("\n")
}

fn summary_note(issues: &[Issue], stamp: &str) -> String {
    let mut lines = generated_header("Reports & Analytics", stamp);

    lines.push("## Issues by Status".to_string());
    lines.push(String::new());
    for entry in projections::status_counts(issues) {
        lines.push(format!("- {} ({})", entry.status.style().label, entry.count));
    }
    lines.push(String::new());

    lines.push("## Issues by Category".to_string());
    lines.push(String::new());
    for entry in projections::category_counts(issues) {
        lines.push(format!("- {} ({})", entry.category, entry.count));
    }
    lines.push(String::new());

    lines.push("## Issues by Severity".to_string());
    lines.push(String::new());
    for entry in projections::severity_counts(issues) {
        lines.push(format!("- {} ({})", entry.severity, entry.count));
    }
    lines.push(String::new());

    lines.push("## Issues Reported Over Time".to_string());
    lines.push(String::new());
    for entry in projections::reported_by_date(issues) {
        lines.push(format!("- {} ({})", entry.date, entry.count));
    }
    lines.join("\n")
}

/// JSON string literals are valid YAML scalars.
fn yaml_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value.escape_default()))
}

/// Ids become file names. Characters outside `[A-Za-z0-9_-]` are percent-encoded
/// byte by byte, so distinct ids always map to distinct stems.
fn note_file_stem(id: &str) -> String {
    let mut stem = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{byte:02X}"));
        }
    }
    stem
}

/// Wiki link labels end at `|` or `]]`.
fn link_label(title: &str) -> String {
    title.replace('|', "\\|").replace("]]", "] ]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_core::dataset;
    use time::macros::datetime;

    #[test]
    fn test_build_vault_writes_expected_files() {
        let dir = tempfile::tempdir().unwrap();
        let issues = dataset::builtin().unwrap();
        let config = DashboardConfig::default();

        let summary =
            build_vault_at(&issues, &config, dir.path(), datetime!(2025-09-10 08:00 UTC)).unwrap();
        assert_eq!(summary.issue_notes, issues.len());
        assert_eq!(summary.files.len(), issues.len() + 4);

        let paths = VaultPaths::new(dir.path());
        assert!(paths.issue_moc().exists());
        assert!(paths.dashboard().exists());
        assert!(paths.summary().exists());
        assert!(paths.csv().exists());

        let note = fs::read_to_string(paths.issue_note("ISS-1001")).unwrap();
        assert!(note.starts_with("---\nid: \"ISS-1001\"\n"));
        assert!(note.contains("generated_at: 2025-09-10T08:00:00Z"));
        assert!(note.contains("status: unresolved"));
    }

    #[test]
    fn test_dashboard_lists_top_n() {
        let issues = dataset::builtin().unwrap();
        let mut config = DashboardConfig::default();
        config.view.top_n = 2;
        let note = dashboard_note(&issues, &config, "stamp");
        // ISS-1006 (51) and ISS-1008 (46) are the most upvoted
        assert!(note.contains("[[Issues/ISS-1006|"));
        assert!(note.contains("[[Issues/ISS-1008|"));
        assert!(!note.contains("[[Issues/ISS-1001|"));
        assert!(note.contains("- Resolution Rate: 33%"));
    }

    #[test]
    fn test_moc_marks_empty_sections() {
        let mut issues = dataset::builtin().unwrap();
        issues.retain(|issue| issue.status == Status::Resolved);
        let moc = issue_moc(&issues, "stamp");
        assert_eq!(moc.matches("_No issues._").count(), 2);
    }

    #[test]
    fn test_note_file_stem_encodes_unsafe_characters() {
        assert_eq!(note_file_stem("ISS-1001"), "ISS-1001");
        assert_eq!(note_file_stem("a/b c"), "a%2Fb%20c");
        assert_eq!(note_file_stem("50%"), "50%25");
        assert_eq!(note_file_stem("é"), "%C3%A9");
    }

    #[test]
    fn test_similar_ids_get_separate_notes() {
        let dir = tempfile::tempdir().unwrap();
        let mut issues = dataset::builtin().unwrap();
        issues.truncate(2);
        issues[0].id = "WARD/7".to_string();
        issues[1].id = "WARD_7".to_string();
        dataset::validate(&issues).unwrap();

        let config = DashboardConfig::default();
        let summary =
            build_vault_at(&issues, &config, dir.path(), datetime!(2025-09-10 08:00 UTC)).unwrap();
        assert_eq!(summary.issue_notes, 2);

        let paths = VaultPaths::new(dir.path());
        let notes = fs::read_dir(&paths.issues_dir).unwrap().count();
        assert_eq!(notes, 2);
        assert_ne!(paths.issue_note("WARD/7"), paths.issue_note("WARD_7"));

        let first = fs::read_to_string(paths.issue_note("WARD/7")).unwrap();
        assert!(first.starts_with("---\nid: \"WARD/7\"\n"));
        let moc = fs::read_to_string(paths.issue_moc()).unwrap();
        assert!(moc.contains("[[Issues/WARD%2F7|"));
        assert!(moc.contains("[[Issues/WARD_7|"));
    }

    #[test]
    fn test_titles_cannot_break_wiki_links() {
        let mut issues = dataset::builtin().unwrap();
        issues.truncate(1);
        issues[0].title = "Pipe | burst [[x]] here".to_string();
        let moc = issue_moc(&issues, "stamp");
        let link = moc.lines().find(|line| line.starts_with("- [[")).unwrap();
        assert_eq!(link, "- [[Issues/ISS-1001|Pipe \\| burst [[x] ] here]]");
        assert_eq!(link.matches("]]").count(), 1);
    }

    #[test]
    fn test_yaml_string_escapes_quotes() {
        assert_eq!(yaml_string("say \"hi\""), "\"say \\\"hi\\\"\"");
    }
}
