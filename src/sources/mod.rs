// Source aggregation.
// Merges the remote manifest and the local repository list into mod descriptors.

pub mod additional;
pub mod manifest;

use std::collections::HashSet;

pub use additional::{AdditionalRepo, load_additional};
pub use manifest::{AuthorGroup, ModEntry, fetch_manifest, parse_manifest};

use crate::github::RepoRef;
use crate::model::{ModDescriptor, Provenance};

/// Build the ordered descriptor list: manifest entries first, then additional ones.
///
/// An additional repository pointing at a repository the manifest already
/// lists is dropped as a duplicate.
pub fn aggregate(groups: &[AuthorGroup], additional: Vec<AdditionalRepo>) -> Vec<ModDescriptor> {
    let mut descriptors = Vec::new();
    let mut seen = HashSet::new();

    for group in groups {
        for entry in &group.entries {
            if let Some(repo) = RepoRef::parse(&entry.source_location) {
                seen.insert(repo.key());
            }
            descriptors.push(ModDescriptor {
                name: entry.name.clone(),
                description: entry.description.clone(),
                category: entry.category.clone(),
                repository: entry.source_location.clone(),
                author: group.display_name.clone(),
                tags: entry.tags.clone(),
                flags: entry.flags.clone(),
                source: Provenance::Manifest,
            });
        }
    }

    let manifest_count = descriptors.len();

    for repo in additional {
        let parsed = RepoRef::parse(&repo.repository);
        if let Some(parsed) = &parsed {
            if !seen.insert(parsed.key()) {
                tracing::debug!("Skipping additional repository {}: already listed", parsed);
                continue;
            }
        }

        let name = if repo.name.trim().is_empty() {
            match &parsed {
                Some(p) => p.name.clone(),
                None => {
                    tracing::warn!("Skipping additional repository without a name or repository");
                    continue;
                }
            }
        } else {
            repo.name
        };
        let author = if repo.author.trim().is_empty() {
            parsed.as_ref().map(|p| p.owner.clone()).unwrap_or_default()
        } else {
            repo.author
        };

        descriptors.push(ModDescriptor {
            name,
            description: repo.description,
            category: repo.category,
            repository: repo.repository,
            author,
            tags: repo.tags,
            flags: Vec::new(),
            source: Provenance::Additional,
        });
    }

    tracing::info!(
        "Aggregated {} mods ({} from manifest, {} additional)",
        descriptors.len(),
        manifest_count,
        descriptors.len() - manifest_count
    );
    descriptors
}
