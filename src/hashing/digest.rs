// Streaming SHA-256 of release assets.
// Downloads are hashed chunk by chunk and abandoned once they exceed the size ceiling.

use futures::StreamExt;
use reqwest::Client;
use sha2::{Digest, Sha256};

use crate::config::AppConfig;
use crate::error::{ModCacheError, Result};

/// Result of hashing one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashOutcome {
    /// Lowercase hex digest and the exact number of bytes downloaded.
    Hashed { sha256: String, size: u64 },
    /// The asset exceeds the size ceiling and was not hashed.
    TooLarge { reported: Option<u64> },
}

/// Downloads assets and computes their content hash.
pub struct AssetHasher {
    client: Client,
    max_bytes: u64,
}

impl AssetHasher {
    pub fn new(client: Client, max_bytes: u64) -> Self {
        Self { client, max_bytes }
    }

    /// Create a hasher from the run configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .build()
            .map_err(ModCacheError::Api)?;
        Ok(Self::new(client, config.max_asset_bytes))
    }

    /// Stream `url` into SHA-256.
    ///
    /// Non-success responses and transport failures are errors; an oversized
    /// asset is a `TooLarge` outcome, not an error.
    pub async fn hash(&self, url: &str) -> Result<HashOutcome> {
        tracing::debug!("Hashing {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModCacheError::Http {
                status: status.as_u16(),
                message: format!("download of {} failed", url),
            });
        }

        if let Some(length) = response.content_length() {
            if length > self.max_bytes {
                return Ok(HashOutcome::TooLarge {
                    reported: Some(length),
                });
            }
        }

        let mut hasher = Sha256::new();
        let mut size: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            size += chunk.len() as u64;
            if size > self.max_bytes {
                return Ok(HashOutcome::TooLarge { reported: None });
            }
            hasher.update(&chunk);
        }

        Ok(HashOutcome::Hashed {
            sha256: hex::encode(hasher.finalize()),
            size,
        })
    }
}
