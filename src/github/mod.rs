// GitHub API module.
// Provides the client and types used to resolve mod releases.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::GitHubClient;
pub use types::*;
