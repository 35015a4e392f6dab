//! Remote node RPC configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Observed default bound on a single `isfinalblock` call.
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Connection settings for the node answering `isfinalblock`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AvalancheRpcConfig {
    /// JSON-RPC endpoint (HTTP POST)
    pub url: String,
    /// Basic auth user, if the node requires it
    pub username: Option<String>,
    /// Basic auth password
    pub password: Option<String>,
    /// Upper bound for the whole request/response exchange
    pub timeout_ms: u64,
}

impl Default for AvalancheRpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8332".to_string(),
            username: None,
            password: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl AvalancheRpcConfig {
    /// Config pointing at `url` with default timeout and no auth.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// Credentials stay out of logs.
impl fmt::Debug for AvalancheRpcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvalancheRpcConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}
