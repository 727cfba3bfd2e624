// Release resolution.
// Turns a repository's GitHub releases into cache releases, degrading to prior data on failure.

use std::collections::HashSet;
use std::time::Duration;

use crate::github::{GitHubAsset, GitHubClient, GitHubRelease, RepoRef};
use crate::model::Release;

/// Outcome of resolving one mod's releases.
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseLookup {
    /// Releases fetched from GitHub.
    Fresh(Vec<Release>),
    /// Fetch failed; prior releases returned unchanged.
    Fallback(Vec<Release>),
    /// Quota exhausted; prior releases returned unchanged and the run must stop.
    RateLimited(Vec<Release>),
}

impl ReleaseLookup {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ReleaseLookup::RateLimited(_))
    }

    pub fn into_releases(self) -> Vec<Release> {
        match self {
            ReleaseLookup::Fresh(r) | ReleaseLookup::Fallback(r) | ReleaseLookup::RateLimited(r) => r,
        }
    }
}

/// Pick the release's distributable asset.
///
/// Suffixes are tried in order, so an asset matching the primary suffix wins
/// over an earlier-listed asset matching a fallback suffix.
pub fn select_asset<'a>(assets: &'a [GitHubAsset], suffixes: &[String]) -> Option<&'a GitHubAsset> {
    suffixes
        .iter()
        .map(|s| s.to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .find_map(|suffix| {
            assets
                .iter()
                .find(|a| a.name.to_ascii_lowercase().ends_with(&suffix))
        })
}

/// Convert raw GitHub releases: drop those without a recognized asset,
/// dedupe by tag (first wins), and sort newest first.
pub fn convert_releases(raw: Vec<GitHubRelease>, suffixes: &[String]) -> Vec<Release> {
    let mut seen = HashSet::new();
    let mut releases: Vec<Release> = raw
        .into_iter()
        .filter_map(|release| {
            let asset = select_asset(&release.assets, suffixes)?;
            let Some(published_at) = release.timestamp() else {
                tracing::debug!("Skipping release {} without a timestamp", release.tag_name);
                return None;
            };
            Some(Release {
                version: release.tag_name.clone(),
                download_url: asset.browser_download_url.clone(),
                release_url: release.html_url.clone(),
                published_at,
                prerelease: release.prerelease,
                draft: release.draft,
                changelog: release.body.clone().unwrap_or_default(),
                file_name: asset.name.clone(),
                file_size: asset.size,
                sha256: None,
            })
        })
        .filter(|r| seen.insert(r.version.clone()))
        .collect();

    // Stable: equal timestamps keep API order.
    releases.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    releases
}

/// Fetch and convert all releases for `repo`, falling back to `prior` on failure.
pub async fn resolve_releases(
    client: &mut GitHubClient,
    repo: &RepoRef,
    prior: &[Release],
    suffixes: &[String],
    per_page: u32,
    page_delay: Duration,
) -> ReleaseLookup {
    match client.list_all_releases(repo, per_page, page_delay).await {
        Ok(raw) => {
            let total = raw.len();
            let releases = convert_releases(raw, suffixes);
            tracing::info!(
                "{}: {} releases, {} with a recognized asset",
                repo,
                total,
                releases.len()
            );
            ReleaseLookup::Fresh(releases)
        }
        Err(e) if e.is_rate_limited() => {
            tracing::warn!("{}: {}; keeping cached releases", repo, e);
            ReleaseLookup::RateLimited(prior.to_vec())
        }
        Err(e) => {
            tracing::warn!("{}: failed to fetch releases: {}; keeping cached releases", repo, e);
            ReleaseLookup::Fallback(prior.to_vec())
        }
    }
}
