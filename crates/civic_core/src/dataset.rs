use crate::error::DatasetError;
use crate::schema::Issue;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

const BUILTIN_YAML: &str = include_str!("../data/issues.yaml");

#[derive(Debug, Deserialize)]
struct TomlDataset {
    issues: Vec<Issue>,
}

/// The seed dataset compiled into the binary.
pub fn builtin() -> Result<Vec<Issue>> {
    let issues: Vec<Issue> =
        serde_yaml::from_str(BUILTIN_YAML).context("parsing built-in issue dataset")?;
    validate(&issues)?;
    Ok(issues)
}

/// Loads a dataset file, picking the format from its extension.
pub fn load(path: &Path) -> Result<Vec<Issue>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading dataset {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let issues: Vec<Issue> = match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing YAML dataset {}", path.display()))?,
        "json" => serde_json::from_str(&raw)
            .with_context(|| format!("parsing JSON dataset {}", path.display()))?,
        "toml" => {
            let file: TomlDataset = toml::from_str(&raw)
                .with_context(|| format!("parsing TOML dataset {}", path.display()))?;
            file.issues
        }
        other => return Err(DatasetError::UnsupportedFormat(other.to_string()).into()),
    };

    validate(&issues).with_context(|| format!("validating dataset {}", path.display()))?;
    info!(path = %path.display(), issues = issues.len(), "loaded dataset");
    Ok(issues)
}

/// Ids must be non-empty and unique.
pub fn validate(issues: &[Issue]) -> Result<(), DatasetError> {
    let mut seen = HashSet::new();
    for (position, issue) in issues.iter().enumerate() {
        if issue.id.trim().is_empty() {
            return Err(DatasetError::EmptyId(position));
        }
        if !seen.insert(issue.id.as_str()) {
            return Err(DatasetError::DuplicateId(issue.id.clone()));
        }
    }
    Ok(())
}
