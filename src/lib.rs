//! modcache library
//!
//! Exposes the refresh pipeline and its building blocks for the binary and integration tests.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod hashing;
pub mod model;
pub mod pipeline;
pub mod resolve;
pub mod sources;

pub use config::AppConfig;
pub use error::{ModCacheError, Result};
pub use pipeline::{Pipeline, RunOutcome, RunReport, RunStats};
