// Cache path utilities.
// Locates the output directory and the files written into it.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// File name of the persisted mod list.
pub const MODS_FILE: &str = "mods.json";

/// File name of the reverse hash index.
pub const HASH_INDEX_FILE: &str = "hash_index.json";

/// Default output directory (~/.cache/modcache on Linux), or ./cache without a home.
pub fn default_output_dir() -> PathBuf {
    ProjectDirs::from("", "", "modcache")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("cache"))
}

/// Path to the mod list inside an output directory.
pub fn mods_path(dir: &Path) -> PathBuf {
    dir.join(MODS_FILE)
}

/// Path to the hash index inside an output directory.
pub fn hash_index_path(dir: &Path) -> PathBuf {
    dir.join(HASH_INDEX_FILE)
}
