// Local list of additional repositories.
// A missing or malformed file contributes nothing and never fails the run.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cache::read_json;

/// A repository supplied locally, outside the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalRepo {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "url")]
    pub repository: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct RepositoryList {
    #[serde(default)]
    repositories: Vec<AdditionalRepo>,
}

/// Load enabled additional repositories from `path`.
pub fn load_additional(path: &Path) -> Vec<AdditionalRepo> {
    let list = match read_json::<RepositoryList>(path) {
        Ok(Some(list)) => list,
        Ok(None) => {
            tracing::info!("No additional repository list at {}", path.display());
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(
                "Ignoring unreadable repository list {}: {}",
                path.display(),
                e
            );
            return Vec::new();
        }
    };

    let total = list.repositories.len();
    let enabled: Vec<_> = list.repositories.into_iter().filter(|r| r.enabled).collect();
    tracing::info!(
        "Loaded {} additional repositories ({} disabled)",
        enabled.len(),
        total - enabled.len()
    );
    enabled
}
