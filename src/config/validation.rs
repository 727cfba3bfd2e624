// Configuration validation rules.
// Applied after all layers and CLI overrides have been merged.

use thiserror::Error;

use super::AppConfig;

/// Ten years; longer windows would never expire in practice.
const MAX_FRESHNESS_DAYS: i64 = 3650;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.manifest_url.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "manifest_url".into(),
                hint: "pass --manifest-url or set MODCACHE_MANIFEST_URL".into(),
            });
        }

        if self.asset_suffixes.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "asset_suffixes".into(),
                reason: "must list at least one suffix".into(),
            });
        }

        if self.per_page == 0 || self.per_page > 100 {
            return Err(ConfigError::Invalid {
                field: "per_page".into(),
                reason: "must be between 1 and 100".into(),
            });
        }

        if self.max_asset_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "max_asset_bytes".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.freshness_days <= 0 {
            return Err(ConfigError::Invalid {
                field: "freshness_days".into(),
                reason: "must be at least one day".into(),
            });
        }

        if self.freshness_days > MAX_FRESHNESS_DAYS {
            return Err(ConfigError::Invalid {
                field: "freshness_days".into(),
                reason: format!("must be at most {} days", MAX_FRESHNESS_DAYS),
            });
        }

        if self.github_token.is_none() {
            tracing::warn!(
                "No GitHub token configured; unauthenticated requests are limited to 60 per hour"
            );
        }

        Ok(())
    }
}
