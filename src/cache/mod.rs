// Cache module for the persisted mod list and hash index.
// Reads the prior snapshot and writes the refreshed documents.

pub mod index;
pub mod paths;
pub mod snapshot;
pub mod store;

pub use index::build_hash_index;
pub use paths::*;
pub use snapshot::{Snapshot, snapshot_key};
pub use store::{read_json, write_cache, write_json};
