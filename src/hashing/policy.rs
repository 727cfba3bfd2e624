// Hash refresh policy.
// Decides whether a mod's release hashes are eligible for recomputation this run.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::model::{Mod, Release};

/// Why a mod's hashes are being refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    NoCachedRecord,
    Stale,
    MissingHashes,
    Forced,
}

impl fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RefreshReason::NoCachedRecord => "no cached record",
            RefreshReason::Stale => "cached hashes past freshness window",
            RefreshReason::MissingHashes => "releases missing hashes",
            RefreshReason::Forced => "forced",
        };
        f.write_str(text)
    }
}

/// Timestamp the freshness window is measured from.
pub fn last_refresh(prior: &Mod) -> DateTime<Utc> {
    prior
        .hash_stats
        .as_ref()
        .and_then(|s| s.last_hash_refresh)
        .unwrap_or(prior.last_updated)
}

/// Decide whether this mod's hashes need refreshing, and why.
///
/// Returns None when every release can take its hash from the cache.
pub fn decide_refresh(
    prior: Option<&Mod>,
    releases: &[Release],
    now: DateTime<Utc>,
    window: Duration,
    force: bool,
) -> Option<RefreshReason> {
    if force {
        return Some(RefreshReason::Forced);
    }

    let Some(prior) = prior else {
        return Some(RefreshReason::NoCachedRecord);
    };

    if now - last_refresh(prior) > window {
        return Some(RefreshReason::Stale);
    }

    let cached_gap = prior
        .releases
        .iter()
        .any(|r| !r.download_url.is_empty() && r.valid_sha256().is_none());
    let uncached = releases
        .iter()
        .any(|r| !r.download_url.is_empty() && prior.release(&r.version).is_none());
    if cached_gap || uncached {
        return Some(RefreshReason::MissingHashes);
    }

    None
}
