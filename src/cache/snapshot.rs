// Prior cache snapshot.
// The previous run's mod list, used as the refresh baseline for this run.

use std::collections::HashMap;
use std::path::Path;

use crate::github::RepoRef;
use crate::model::{Mod, ModDescriptor};

use super::store::read_json;

/// Previously written mods, looked up by repository (or name when there is none).
#[derive(Debug, Default)]
pub struct Snapshot {
    mods: HashMap<String, Mod>,
}

impl Snapshot {
    /// Load the snapshot at `path`. Absent or unreadable files yield an empty snapshot.
    pub fn load(path: &Path) -> Self {
        match read_json::<Vec<Mod>>(path) {
            Ok(Some(mods)) => {
                tracing::info!("Loaded {} cached mods from {}", mods.len(), path.display());
                Self::from_mods(mods)
            }
            Ok(None) => {
                tracing::info!("No existing cache at {}, starting fresh", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable cache {}: {}; all hashes will be recomputed",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn from_mods(mods: Vec<Mod>) -> Self {
        let mods = mods
            .into_iter()
            .map(|m| (snapshot_key(&m.descriptor), m))
            .collect();
        Self { mods }
    }

    /// The cached record for the mod this descriptor identifies.
    pub fn get(&self, descriptor: &ModDescriptor) -> Option<&Mod> {
        self.mods.get(&snapshot_key(descriptor))
    }

    pub fn len(&self) -> usize {
        self.mods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }
}

/// Identity of a mod across runs.
///
/// Distinct repositories may share a mod name, so the repository wins; the
/// name only identifies mods without a parseable repository.
pub fn snapshot_key(descriptor: &ModDescriptor) -> String {
    match RepoRef::parse(&descriptor.repository) {
        Some(repo) => format!("repo:{}", repo.key()),
        None => format!("name:{}", descriptor.name),
    }
}
