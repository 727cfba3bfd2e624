// Application configuration with layered loading.
// Defaults, then an optional TOML file, then MODCACHE_* environment variables.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::default_output_dir;

mod validation;

pub use validation::ConfigError;

/// Runtime configuration for a refresh run.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (MODCACHE_*, plus GITHUB_TOKEN for the token)
/// 2. TOML config file (if MODCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
///
/// CLI flags are applied on top by the binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// URL of the remote mod manifest. Required.
    #[serde(default)]
    pub manifest_url: String,

    /// Local list of additional repositories.
    #[serde(default = "default_repositories_file")]
    pub repositories_file: PathBuf,

    /// Directory receiving mods.json and hash_index.json.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Base URL of the GitHub REST API.
    #[serde(default = "default_github_api_base")]
    pub github_api_base: String,

    /// Token raising the GitHub rate-limit ceiling.
    #[serde(default)]
    pub github_token: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Recognized release asset suffixes, most preferred first.
    #[serde(default = "default_asset_suffixes")]
    pub asset_suffixes: Vec<String>,

    /// Releases requested per page (GitHub caps this at 100).
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Age after which a mod's hashes become eligible for recomputation.
    #[serde(default = "default_freshness_days")]
    pub freshness_days: i64,

    /// Assets larger than this are not hashed.
    #[serde(default = "default_max_asset_bytes")]
    pub max_asset_bytes: u64,

    /// Pause between release pages of one repository.
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Pause after each mod's release resolution.
    #[serde(default = "default_release_delay_ms")]
    pub release_delay_ms: u64,

    /// Pause after each asset hash attempt.
    #[serde(default = "default_hash_delay_ms")]
    pub hash_delay_ms: u64,

    /// HTTP request timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_repositories_file() -> PathBuf {
    PathBuf::from("repositories.json")
}

fn default_github_api_base() -> String {
    "https://api.github.com".into()
}

fn default_user_agent() -> String {
    concat!("modcache/", env!("CARGO_PKG_VERSION")).into()
}

fn default_asset_suffixes() -> Vec<String> {
    vec![".zip".into(), ".tar.gz".into()]
}

fn default_per_page() -> u32 {
    100
}

fn default_freshness_days() -> i64 {
    7
}

fn default_max_asset_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_page_delay_ms() -> u64 {
    200
}

fn default_release_delay_ms() -> u64 {
    500
}

fn default_hash_delay_ms() -> u64 {
    1000
}

fn default_timeout_ms() -> u64 {
    60_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            manifest_url: String::new(),
            repositories_file: default_repositories_file(),
            output_dir: default_output_dir(),
            github_api_base: default_github_api_base(),
            github_token: None,
            user_agent: default_user_agent(),
            asset_suffixes: default_asset_suffixes(),
            per_page: default_per_page(),
            freshness_days: default_freshness_days(),
            max_asset_bytes: default_max_asset_bytes(),
            page_delay_ms: default_page_delay_ms(),
            release_delay_ms: default_release_delay_ms(),
            hash_delay_ms: default_hash_delay_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// Does not validate: the binary applies CLI overrides first and then
    /// calls [`AppConfig::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("MODCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(Env::prefixed("MODCACHE_").map(|key| key.as_str().to_lowercase().into()));

        let mut config: Self = figment
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        if config.github_token.is_none() {
            config.github_token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
        }

        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn release_delay(&self) -> Duration {
        Duration::from_millis(self.release_delay_ms)
    }

    pub fn hash_delay(&self) -> Duration {
        Duration::from_millis(self.hash_delay_ms)
    }

    /// Freshness window as a chrono duration for timestamp arithmetic.
    ///
    /// Saturates instead of overflowing for day counts chrono cannot represent.
    pub fn freshness_window(&self) -> chrono::Duration {
        chrono::Duration::try_days(self.freshness_days).unwrap_or(if self.freshness_days < 0 {
            chrono::Duration::MIN
        } else {
            chrono::Duration::MAX
        })
    }
}
