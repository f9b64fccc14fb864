//! State holder for one interactive session of the issue view.
//!
//! Owns the issue collection, the current [`QueryConfig`] and the id of the
//! issue open in the detail view. Everything is reset when the session is
//! dropped; nothing is written back to the dataset.

use crate::query::{self, Filter, QueryConfig, SortKey};
use crate::schema::{Issue, Severity, Status};

#[derive(Debug, Clone)]
pub struct Session {
    issues: Vec<Issue>,
    config: QueryConfig,
    selected: Option<String>,
}

impl Session {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self::with_config(issues, QueryConfig::default())
    }

    pub fn with_config(issues: Vec<Issue>, config: QueryConfig) -> Self {
        Self {
            issues,
            config,
            selected: None,
        }
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn set_tab(&mut self, status: Status) {
        self.config.status_tab = status;
    }

    pub fn set_category(&mut self, category: Filter<String>) {
        self.config.category = category;
    }

    pub fn set_severity(&mut self, severity: Filter<Severity>) {
        self.config.severity = severity;
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.config.search_text = text.into();
    }

    pub fn set_sort(&mut self, key: SortKey) {
        self.config.sort_key = key;
    }

    /// Back to the unfiltered view of the current tab.
    pub fn reset_filters(&mut self) {
        self.config = QueryConfig {
            status_tab: self.config.status_tab,
            sort_key: self.config.sort_key,
            ..QueryConfig::default()
        };
    }

    pub fn visible(&self) -> Vec<&Issue> {
        query::query(&self.issues, &self.config)
    }

    pub fn find(&self, id: &str) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.id == id)
    }

    /// Opens `id` in the detail view. An unknown id leaves the current selection alone.
    pub fn select(&mut self, id: &str) -> Option<&Issue> {
        let found = self.issues.iter().position(|issue| issue.id == id)?;
        self.selected = Some(id.to_string());
        self.issues.get(found)
    }

    pub fn selected(&self) -> Option<&Issue> {
        self.selected.as_deref().and_then(|id| self.find(id))
    }

    pub fn close(&mut self) {
        self.selected = None;
    }

    pub fn set_status(&mut self, id: &str, status: Status) -> bool {
        query::set_status(&mut self.issues, id, status)
    }

    /// Status change from the detail view. The issue stays selected even if
    /// it leaves the current tab.
    pub fn update_selected_status(&mut self, status: Status) -> Option<&Issue> {
        let id = self.selected.clone()?;
        query::set_status(&mut self.issues, &id, status);
        self.find(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset;

    fn session() -> Session {
        Session::new(dataset::builtin().unwrap())
    }

    #[test]
    fn test_visible_respects_tab() {
        let mut session = session();
        assert!(session.visible().iter().all(|i| i.status == Status::Unresolved));
        session.set_tab(Status::Resolved);
        assert!(!session.visible().is_empty());
        assert!(session.visible().iter().all(|i| i.status == Status::Resolved));
    }

    #[test]
    fn test_filters_compose() {
        let mut session = session();
        session.set_category(Filter::Only("Water Supply".to_string()));
        session.set_severity(Filter::Only(Severity::High));
        let visible = session.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "ISS-1008");

        session.reset_filters();
        assert_eq!(session.config().category, Filter::All);
        assert_eq!(session.config().status_tab, Status::Unresolved);
    }

    #[test]
    fn test_selection_survives_status_change() {
        let mut session = session();
        assert!(session.select("ISS-1001").is_some());
        let updated = session.update_selected_status(Status::Resolved).unwrap();
        assert_eq!(updated.status, Status::Resolved);

        assert_eq!(session.selected().unwrap().id, "ISS-1001");
        assert!(session.visible().iter().all(|i| i.id != "ISS-1001"));

        session.set_tab(Status::Resolved);
        assert!(session.visible().iter().any(|i| i.id == "ISS-1001"));
    }

    #[test]
    fn test_select_unknown_keeps_previous_selection() {
        let mut session = session();
        session.select("ISS-1002");
        assert!(session.select("nope").is_none());
        assert_eq!(session.selected().unwrap().id, "ISS-1002");
        session.close();
        assert!(session.selected().is_none());
        assert!(session.update_selected_status(Status::Resolved).is_none());
    }

    #[test]
    fn test_set_status_unknown_id() {
        let mut session = session();
        let before = session.issues().to_vec();
        assert!(!session.set_status("ISS-0000", Status::Resolved));
        assert_eq!(session.issues(), before.as_slice());
    }
}
