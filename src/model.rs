// Persisted cache types.
// Mod descriptors, releases, per-mod hash coverage, and the reverse hash index.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a mod descriptor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    #[default]
    Manifest,
    Additional,
}

/// Normalized mod metadata produced by the source aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Repository URL as given by the source, possibly unparseable.
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub source: Provenance,
}

/// One published version of a mod with its selected asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub version: String,
    pub download_url: String,
    #[serde(default)]
    pub release_url: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub changelog: String,
    pub file_name: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub sha256: Option<String>,
}

impl Release {
    /// The cached hash, if it is a well-formed digest.
    pub fn valid_sha256(&self) -> Option<&str> {
        self.sha256.as_deref().filter(|h| is_sha256_hex(h))
    }
}

/// Newest release projection stored alongside the full list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestRelease {
    pub version: String,
    pub download_url: String,
}

/// Hash coverage for one mod.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashCoverage {
    pub total_releases: usize,
    pub releases_with_hash: usize,
    pub last_hash_refresh: Option<DateTime<Utc>>,
}

/// Persisted unit of the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mod {
    #[serde(flatten)]
    pub descriptor: ModDescriptor,
    #[serde(default)]
    pub releases: Vec<Release>,
    #[serde(default)]
    pub latest: Option<LatestRelease>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub hash_stats: Option<HashCoverage>,
}

impl Mod {
    /// Assemble a mod record, deriving the latest projection and coverage.
    ///
    /// `releases` must already be sorted newest first.
    pub fn assemble(
        descriptor: ModDescriptor,
        releases: Vec<Release>,
        last_updated: DateTime<Utc>,
        last_hash_refresh: Option<DateTime<Utc>>,
    ) -> Self {
        let latest = releases.first().map(|r| LatestRelease {
            version: r.version.clone(),
            download_url: r.download_url.clone(),
        });
        let hash_stats = Some(HashCoverage {
            total_releases: releases.len(),
            releases_with_hash: releases.iter().filter(|r| r.sha256.is_some()).count(),
            last_hash_refresh,
        });

        Self {
            descriptor,
            releases,
            latest,
            last_updated,
            hash_stats,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Find a cached release by its version tag.
    pub fn release(&self, version: &str) -> Option<&Release> {
        self.releases.iter().find(|r| r.version == version)
    }
}

/// Reverse lookup entry stored under a content hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashRecord {
    pub mod_name: String,
    pub mod_source: Provenance,
    pub version: String,
    pub file_name: String,
    pub file_size: u64,
    pub published_at: DateTime<Utc>,
    pub download_url: String,
}

/// Content hash to every mod/version shipping those exact bytes.
pub type HashIndex = BTreeMap<String, Vec<HashRecord>>;

/// Check for a 64-character lowercase hex SHA-256 digest.
pub fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64 && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
