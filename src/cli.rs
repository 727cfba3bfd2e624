// Command-line interface.
// Parses flags and applies them on top of the loaded configuration.

use std::path::PathBuf;

use clap::Parser;

use crate::config::AppConfig;

/// Refresh the local mod cache from the manifest and GitHub releases
#[derive(Parser, Debug)]
#[command(name = "modcache")]
#[command(version)]
pub struct Cli {
    /// Recompute every asset hash regardless of cache freshness
    #[arg(long)]
    pub force_hash: bool,

    /// Manifest URL (overrides MODCACHE_MANIFEST_URL)
    #[arg(long, value_name = "URL")]
    pub manifest_url: Option<String>,

    /// Local additional repositories file (overrides MODCACHE_REPOSITORIES_FILE)
    #[arg(long, value_name = "PATH")]
    pub repositories: Option<PathBuf>,

    /// Directory for mods.json and hash_index.json (overrides MODCACHE_OUTPUT_DIR)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

impl Cli {
    /// Override configuration values with any flags given.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.manifest_url {
            config.manifest_url = url.clone();
        }
        if let Some(path) = &self.repositories {
            config.repositories_file = path.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
    }
}
