// Reverse hash index.
// Maps each content hash to every mod release that ships those bytes.

use crate::model::{HashIndex, HashRecord, Mod, is_sha256_hex};

/// Scan all releases and collect a lookup record under each well-formed hash.
pub fn build_hash_index(mods: &[Mod]) -> HashIndex {
    let mut index = HashIndex::new();

    for m in mods {
        for release in &m.releases {
            let Some(hash) = release.sha256.as_deref().filter(|h| is_sha256_hex(h)) else {
                continue;
            };
            index.entry(hash.to_string()).or_default().push(HashRecord {
                mod_name: m.descriptor.name.clone(),
                mod_source: m.descriptor.source,
                version: release.version.clone(),
                file_name: release.file_name.clone(),
                file_size: release.file_size,
                published_at: release.published_at,
                download_url: release.download_url.clone(),
            });
        }
    }

    index
}
