// Remote manifest fetching and parsing.
// The manifest is an object of author groups, each holding an author mapping and mod entries.

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ModCacheError, Result};

/// One author's block of the manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorGroup {
    pub key: String,
    pub display_name: String,
    pub entries: Vec<ModEntry>,
}

/// A mod listed in the manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct ModEntry {
    pub key: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub source_location: String,
    pub tags: Vec<String>,
    pub flags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    #[serde(default)]
    author: Map<String, Value>,
    #[serde(default, alias = "entries")]
    mods: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    name: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    #[serde(default, alias = "repository", alias = "source_location")]
    source_location: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    flags: Vec<String>,
}

/// Download and parse the manifest. Any failure here is fatal to the run.
pub async fn fetch_manifest(client: &Client, url: &str) -> Result<Vec<AuthorGroup>> {
    tracing::info!("Fetching manifest from {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ModCacheError::Manifest(format!("request to {} failed: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ModCacheError::Manifest(format!(
            "{} returned HTTP {}",
            url, status
        )));
    }

    let text = response
        .text()
        .await
        .map_err(|e| ModCacheError::Manifest(format!("reading {} failed: {}", url, e)))?;

    parse_manifest(&text)
}

/// Parse manifest JSON, preserving group and entry document order.
///
/// The document itself must be a JSON object; individual groups or entries
/// that do not match the expected shape are skipped with a warning.
pub fn parse_manifest(text: &str) -> Result<Vec<AuthorGroup>> {
    let root: Value = serde_json::from_str(text)
        .map_err(|e| ModCacheError::Manifest(format!("invalid JSON: {}", e)))?;
    let Value::Object(groups) = root else {
        return Err(ModCacheError::Manifest(
            "top level must be an object of author groups".to_string(),
        ));
    };

    let mut parsed = Vec::with_capacity(groups.len());
    for (group_key, group_value) in groups {
        let raw: RawGroup = match serde_json::from_value(group_value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Skipping manifest group {}: {}", group_key, e);
                continue;
            }
        };

        let display_name = raw
            .author
            .keys()
            .next()
            .cloned()
            .unwrap_or_else(|| group_key.clone());

        let mut entries = Vec::with_capacity(raw.mods.len());
        for (entry_key, entry_value) in raw.mods {
            match serde_json::from_value::<RawEntry>(entry_value) {
                Ok(entry) => entries.push(ModEntry {
                    name: entry
                        .name
                        .filter(|n| !n.trim().is_empty())
                        .unwrap_or_else(|| entry_key.clone()),
                    key: entry_key,
                    description: entry.description,
                    category: entry.category,
                    source_location: entry.source_location,
                    tags: entry.tags,
                    flags: entry.flags,
                }),
                Err(e) => tracing::warn!("Skipping manifest entry {}/{}: {}", group_key, entry_key, e),
            }
        }

        parsed.push(AuthorGroup {
            key: group_key,
            display_name,
            entries,
        });
    }

    Ok(parsed)
}
