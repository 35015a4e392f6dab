//! Finality Oracle backed by the node's `isfinalblock` RPC.

use crate::config::AvalancheRpcConfig;
use crate::domain::{FinalityRequest, FinalityResponse};
use crate::error::{FinalityError, FinalityResult};
use crate::ports::inbound::FinalityOracle;
use async_trait::async_trait;
use tracing::{debug, error, warn};

/// Single-shot, no-retry finality check over HTTP JSON-RPC.
pub struct AvalancheFinalityOracle {
    config: AvalancheRpcConfig,
    http_client: reqwest::Client,
}

impl AvalancheFinalityOracle {
    pub fn new(config: AvalancheRpcConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Share an existing connection pool.
    pub fn with_client(config: AvalancheRpcConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &AvalancheRpcConfig {
        &self.config
    }

    /// Fallible form of [`FinalityOracle::is_final`].
    ///
    /// The timeout covers connect, send and body read; expiry is reported as
    /// [`FinalityError::Timeout`].
    pub async fn check(&self, block_hash: &str) -> FinalityResult<bool> {
        match tokio::time::timeout(self.config.timeout(), self.call(block_hash)).await {
            Ok(verdict) => verdict,
            Err(_) => Err(FinalityError::Timeout {
                timeout_ms: self.config.timeout_ms,
            }),
        }
    }

    async fn call(&self, block_hash: &str) -> FinalityResult<bool> {
        let mut request = self
            .http_client
            .post(&self.config.url)
            .json(&FinalityRequest::new(block_hash));

        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_deref());
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        let parsed: FinalityResponse =
            serde_json::from_slice(&body).map_err(|e| FinalityError::MalformedResponse {
                reason: format!("HTTP {}: {}", status, e),
            })?;

        // Node errors arrive with a non-2xx status; a bare result only counts on 2xx.
        if parsed.error.is_none() && !status.is_success() {
            return Err(FinalityError::MalformedResponse {
                reason: format!("HTTP {}", status),
            });
        }

        parsed.verdict()
    }
}

#[async_trait]
impl FinalityOracle for AvalancheFinalityOracle {
    async fn is_final(&self, block_hash: &str) -> bool {
        match self.check(block_hash).await {
            Ok(is_final) => {
                debug!(block_hash = %block_hash, is_final, "isfinalblock answered");
                is_final
            }
            Err(FinalityError::Node(node_error)) => {
                warn!(
                    block_hash = %block_hash,
                    error = %node_error,
                    "Node error from isFinalBlock"
                );
                false
            }
            Err(err) => {
                error!(
                    block_hash = %block_hash,
                    error = %err,
                    "Error in isFinalBlock({})", block_hash
                );
                false
            }
        }
    }
}
