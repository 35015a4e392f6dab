//! Indexer HTTP adapter (reqwest).

use crate::domain::BlockDetails;
use crate::error::{IngestionError, IngestionResult};
use crate::ports::IndexerClient;
use async_trait::async_trait;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the indexer's `/block/{hash}` endpoint.
pub struct ChronikHttpClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl ChronikHttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(base_url, super::http_client(timeout))
    }

    pub fn with_client(base_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl IndexerClient for ChronikHttpClient {
    async fn block(&self, block_hash: &str) -> IngestionResult<BlockDetails> {
        let indexer_error = |reason: String| IngestionError::Indexer {
            block_hash: block_hash.to_string(),
            reason,
        };

        let response = self
            .http_client
            .get(format!("{}/block/{}", self.base_url, block_hash))
            .send()
            .await
            .map_err(|e| indexer_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(indexer_error(format!("HTTP {}: {}", status, body)));
        }

        response
            .json::<BlockDetails>()
            .await
            .map_err(|e| indexer_error(e.to_string()))
    }
}
