use crate::query::{QueryConfig, SortKey};
use crate::schema::Status;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub admin: AdminConfig,
    pub map: MapConfig,
    pub view: ViewConfig,
    pub dataset: DatasetConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub default_tab: Status,
    pub default_sort: SortKey,
    pub top_n: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: Option<PathBuf>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            name: "Admin".to_string(),
            location: "Pune, Maharashtra".to_string(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: 18.52,
            center_lng: 73.8567,
            zoom: 13,
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_tab: Status::Unresolved,
            default_sort: SortKey::Date,
            top_n: 5,
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: DashboardConfig =
            toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?;

        // dataset paths are relative to the config file
        if let Some(dataset) = config.dataset.path.as_mut() {
            if dataset.is_relative() {
                if let Some(parent) = path.parent() {
                    *dataset = parent.join(&*dataset);
                }
            }
        }
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Query configuration the issue view starts with.
    pub fn initial_query(&self) -> QueryConfig {
        QueryConfig {
            status_tab: self.view.default_tab,
            sort_key: self.view.default_sort,
            ..QueryConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("dashboard.toml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file() {
        let config = DashboardConfig::load_or_default(None).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.view.top_n, 5);
        assert_eq!(config.map.zoom, 13);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            [admin]
            name = "Ward Officer"

            [view]
            default_sort = "upvotes"
            "#,
        );
        let config = DashboardConfig::load(&path).unwrap();
        assert_eq!(config.admin.name, "Ward Officer");
        assert_eq!(config.admin.location, "Pune, Maharashtra");
        assert_eq!(config.view.default_sort, SortKey::Upvotes);
        assert_eq!(config.view.top_n, 5);
        assert_eq!(config.initial_query().sort_key, SortKey::Upvotes);
    }

    #[test]
    fn test_relative_dataset_path_resolves_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[dataset]\npath = \"issues.yaml\"\n");
        let config = DashboardConfig::load(&path).unwrap();
        assert_eq!(config.dataset.path, Some(dir.path().join("issues.yaml")));
    }

    #[test]
    fn test_unknown_sort_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[view]\ndefault_sort = \"popularity\"\n");
        assert!(DashboardConfig::load(&path).is_err());
    }

    #[test]
    fn test_default_tab_parses_kebab_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[view]\ndefault_tab = \"in-progress\"\n");
        let config = DashboardConfig::load(&path).unwrap();
        assert_eq!(config.initial_query().status_tab, Status::InProgress);
    }
}
