// Cache store for reading and writing cache documents.
// Handles JSON serialization and atomic filesystem writes.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;
use crate::model::{HashIndex, Mod};

use super::paths::{hash_index_path, mods_path};

/// Read a JSON document, returning None when the file does not exist.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    let value: T = serde_json::from_str(&contents)?;
    Ok(Some(value))
}

/// Write a JSON document atomically.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut json = serde_json::to_string_pretty(data)?;
    json.push('\n');

    // Write atomically via temp file
    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Write the mod list and its hash index into `dir`.
///
/// Mods are written verbatim, in the order given.
pub fn write_cache(dir: &Path, mods: &[Mod], index: &HashIndex) -> Result<()> {
    write_json(&mods_path(dir), mods)?;
    write_json(&hash_index_path(dir), index)?;

    tracing::info!(
        "Wrote {} mods and {} hash keys to {}",
        mods.len(),
        index.len(),
        dir.display()
    );
    Ok(())
}
