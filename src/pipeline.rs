// Refresh pipeline.
// Loads sources, refreshes each mod against the prior snapshot, then writes the cache and index.

use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::Client;

use crate::cache::{Snapshot, build_hash_index, mods_path, write_cache};
use crate::config::AppConfig;
use crate::error::{ModCacheError, Result};
use crate::github::{GitHubClient, RepoRef};
use crate::hashing::{AssetHasher, HashTally, apply_hashes, decide_refresh, last_refresh};
use crate::model::{Mod, ModDescriptor};
use crate::resolve::{ReleaseLookup, resolve_releases};
use crate::sources::{aggregate, fetch_manifest, load_additional};

/// How a run ended. Fatal failures surface as errors instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every mod was processed and the cache written.
    Written,
    /// GitHub quota ran out; processed mods plus carried-forward ones were written.
    RateLimitedPartial,
}

/// Summary statistics of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub mods_total: usize,
    pub mods_processed: usize,
    pub mods_carried_forward: usize,
    pub mods_written: usize,
    pub mods_with_releases: usize,
    pub releases_total: usize,
    pub releases_with_hash: usize,
    pub hashes: HashTally,
}

impl RunStats {
    /// Share of written releases that carry a hash, in percent.
    pub fn coverage_percent(&self) -> f64 {
        if self.releases_total == 0 {
            return 0.0;
        }
        self.releases_with_hash as f64 * 100.0 / self.releases_total as f64
    }

    fn count_written(&mut self, mods: &[Mod]) {
        self.mods_written = mods.len();
        self.mods_with_releases = mods.iter().filter(|m| !m.releases.is_empty()).count();
        self.releases_total = mods.iter().map(|m| m.releases.len()).sum();
        self.releases_with_hash = mods
            .iter()
            .flat_map(|m| &m.releases)
            .filter(|r| r.sha256.is_some())
            .count();
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Mods: {} written ({} processed, {} carried forward) of {} listed, {} with releases",
            self.mods_written,
            self.mods_processed,
            self.mods_carried_forward,
            self.mods_total,
            self.mods_with_releases
        )?;
        writeln!(
            f,
            "Releases: {} total, {} hashed ({:.1}% coverage)",
            self.releases_total,
            self.releases_with_hash,
            self.coverage_percent()
        )?;
        write!(
            f,
            "Hashes: {} computed, {} reused, {} failed, {} oversized",
            self.hashes.computed, self.hashes.reused, self.hashes.failed, self.hashes.oversized
        )
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub stats: RunStats,
}

enum ModRefresh {
    Refreshed(Mod, HashTally),
    RateLimited,
}

/// Owns the clients and configuration for one refresh run.
pub struct Pipeline {
    config: AppConfig,
    http: Client,
    github: GitHubClient,
    hasher: AssetHasher,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .build()
            .map_err(ModCacheError::Api)?;
        let github = GitHubClient::from_config(&config)?;
        let hasher = AssetHasher::from_config(&config)?;

        Ok(Self {
            config,
            http,
            github,
            hasher,
        })
    }

    /// Run the full refresh. Only manifest and write failures are errors.
    pub async fn run(&mut self, force: bool) -> Result<RunReport> {
        let snapshot = Snapshot::load(&mods_path(&self.config.output_dir));
        if snapshot.is_empty() {
            tracing::debug!("No prior mods to reuse; every hash will be computed");
        } else {
            tracing::debug!(cached = snapshot.len(), "Using prior snapshot as refresh baseline");
        }

        let groups = fetch_manifest(&self.http, &self.config.manifest_url).await?;
        let additional = load_additional(&self.config.repositories_file);
        let descriptors = aggregate(&groups, additional);

        let (mods, mut stats, outcome) = self.refresh_all(descriptors, &snapshot, force).await;

        let index = build_hash_index(&mods);
        write_cache(&self.config.output_dir, &mods, &index)?;

        stats.count_written(&mods);
        tracing::info!(
            mods = stats.mods_written,
            releases = stats.releases_total,
            hashed = stats.releases_with_hash,
            computed = stats.hashes.computed,
            reused = stats.hashes.reused,
            "Refresh finished with {:.1}% hash coverage",
            stats.coverage_percent()
        );

        Ok(RunReport { outcome, stats })
    }

    /// Refresh every descriptor in order, stopping at the first rate limit.
    ///
    /// After a rate limit, the remaining mods (including the one that hit it)
    /// are carried forward from the snapshot untouched; those never cached
    /// before are left out until a later run reaches them.
    async fn refresh_all(
        &mut self,
        descriptors: Vec<ModDescriptor>,
        snapshot: &Snapshot,
        force: bool,
    ) -> (Vec<Mod>, RunStats, RunOutcome) {
        let mut stats = RunStats {
            mods_total: descriptors.len(),
            ..Default::default()
        };
        let mut mods = Vec::with_capacity(descriptors.len());
        let mut outcome = RunOutcome::Written;

        for descriptor in descriptors {
            let name = descriptor.name.clone();
            let prior = snapshot.get(&descriptor);

            if outcome == RunOutcome::Written {
                match self.refresh_mod(descriptor, prior, Utc::now(), force).await {
                    ModRefresh::Refreshed(m, tally) => {
                        stats.mods_processed += 1;
                        stats.hashes.add(tally);
                        mods.push(m);
                        continue;
                    }
                    ModRefresh::RateLimited => {
                        tracing::warn!(
                            "Rate limit reached at {}; carrying remaining mods forward from cache",
                            name
                        );
                        outcome = RunOutcome::RateLimitedPartial;
                    }
                }
            }

            if let Some(prior) = prior {
                mods.push(prior.clone());
                stats.mods_carried_forward += 1;
            }
        }

        (mods, stats, outcome)
    }

    async fn refresh_mod(
        &mut self,
        descriptor: ModDescriptor,
        prior: Option<&Mod>,
        now: DateTime<Utc>,
        force: bool,
    ) -> ModRefresh {
        let Some(repo) = RepoRef::parse(&descriptor.repository) else {
            tracing::debug!("{}: no GitHub repository, skipping releases", descriptor.name);
            return ModRefresh::Refreshed(
                Mod::assemble(descriptor, Vec::new(), now, None),
                HashTally::default(),
            );
        };

        let prior_releases = prior.map(|p| p.releases.as_slice()).unwrap_or(&[]);
        let lookup = resolve_releases(
            &mut self.github,
            &repo,
            prior_releases,
            &self.config.asset_suffixes,
            self.config.per_page,
            self.config.page_delay(),
        )
        .await;
        tokio::time::sleep(self.config.release_delay()).await;

        if lookup.is_rate_limited() {
            return ModRefresh::RateLimited;
        }
        let last_updated = match (&lookup, prior) {
            (ReleaseLookup::Fallback(_), Some(prior)) => prior.last_updated,
            _ => now,
        };
        let releases = lookup.into_releases();

        let reason = decide_refresh(
            prior,
            &releases,
            now,
            self.config.freshness_window(),
            force,
        );
        if let Some(reason) = reason {
            tracing::info!("{}: refreshing hashes ({})", descriptor.name, reason);
        }

        let (releases, tally) = apply_hashes(
            &self.hasher,
            releases,
            prior,
            reason,
            self.config.hash_delay(),
        )
        .await;

        let last_hash_refresh = match reason {
            Some(_) => Some(now),
            None => prior.map(last_refresh),
        };

        ModRefresh::Refreshed(
            Mod::assemble(descriptor, releases, last_updated, last_hash_refresh),
            tally,
        )
    }
}
