// Hash decision engine.
// Applies the refresh policy per release: reuse a cached digest or download and hash the asset.

pub mod digest;
pub mod policy;

use std::time::Duration;

pub use digest::{AssetHasher, HashOutcome};
pub use policy::{RefreshReason, decide_refresh, last_refresh};

use crate::model::{Mod, Release};

/// Per-mod counts of what happened to each release's hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashTally {
    pub computed: usize,
    pub reused: usize,
    pub failed: usize,
    pub oversized: usize,
}

impl HashTally {
    pub fn add(&mut self, other: HashTally) {
        self.computed += other.computed;
        self.reused += other.reused;
        self.failed += other.failed;
        self.oversized += other.oversized;
    }
}

/// Fill in `sha256` (and the recorded size) for each release.
///
/// With no refresh reason every release copies its cached hash verbatim. With
/// a reason, releases that already have a valid cached hash still reuse it
/// unless the refresh is forced; the rest are downloaded and hashed, each
/// attempt followed by `hash_delay`.
pub async fn apply_hashes(
    hasher: &AssetHasher,
    mut releases: Vec<Release>,
    prior: Option<&Mod>,
    reason: Option<RefreshReason>,
    hash_delay: Duration,
) -> (Vec<Release>, HashTally) {
    let mut tally = HashTally::default();

    for release in &mut releases {
        let cached = prior
            .and_then(|p| p.release(&release.version))
            .and_then(|c| c.valid_sha256().map(|h| (h.to_string(), c.file_size)));

        let eligible = match reason {
            None => false,
            Some(RefreshReason::Forced) => true,
            Some(_) => cached.is_none(),
        };

        if !eligible {
            release.sha256 = None;
            if let Some((sha256, size)) = cached {
                release.sha256 = Some(sha256);
                release.file_size = size;
                tally.reused += 1;
            }
            continue;
        }

        if release.download_url.is_empty() {
            release.sha256 = None;
            continue;
        }

        match hasher.hash(&release.download_url).await {
            Ok(HashOutcome::Hashed { sha256, size }) => {
                release.sha256 = Some(sha256);
                release.file_size = size;
                tally.computed += 1;
            }
            Ok(HashOutcome::TooLarge { reported }) => {
                tracing::warn!(
                    "{} ({}): asset exceeds size ceiling ({} bytes reported), not hashed",
                    release.version,
                    release.file_name,
                    reported.unwrap_or(release.file_size)
                );
                release.sha256 = None;
                tally.oversized += 1;
            }
            Err(e) => {
                tracing::warn!("{} ({}): hashing failed: {}", release.version, release.file_name, e);
                release.sha256 = None;
                if let Some((sha256, size)) = cached {
                    release.sha256 = Some(sha256);
                    release.file_size = size;
                }
                tally.failed += 1;
            }
        }

        tokio::time::sleep(hash_delay).await;
    }

    (releases, tally)
}
