//! # Runtime Configuration
//!
//! Everything comes from `HERALD_*` environment variables. Required values
//! have no defaults; the rest default to the public eCash endpoints.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `HERALD_CHRONIK_URL` | `https://chronik.fabien.cash` |
//! | `HERALD_CHRONIK_WS_URL` | derived from `HERALD_CHRONIK_URL` |
//! | `HERALD_ADDRESS` | required |
//! | `HERALD_TELEGRAM_BOT_TOKEN` | required |
//! | `HERALD_TELEGRAM_CHANNEL_ID` | required |
//! | `HERALD_TELEGRAM_API_URL` | `https://api.telegram.org` |
//! | `HERALD_EXPLORER_URL` | `https://explorer.e.cash` |
//! | `HERALD_AVALANCHE_RPC_URL` | `http://127.0.0.1:8332` |
//! | `HERALD_AVALANCHE_RPC_USER` / `HERALD_AVALANCHE_RPC_PASSWORD` | unset |
//! | `HERALD_AVALANCHE_TIMEOUT_MS` | `1000` |
//! | `HERALD_BLOCK_STRATEGY` | `notify-only` |
//! | `HERALD_ANNOUNCE_FINALIZED` | `false` |

use bh_01_finality::{AvalancheRpcConfig, DEFAULT_TIMEOUT_MS};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_CHRONIK_URL: &str = "https://chronik.fabien.cash";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_EXPLORER_URL: &str = "https://explorer.e.cash";

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be set")]
    Missing { var: &'static str },

    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Which block handler strategy the process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    #[default]
    NotifyOnly,
    StateMutating,
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "notify-only" | "notify" => Ok(Self::NotifyOnly),
            "state-mutating" | "state" => Ok(Self::StateMutating),
            other => Err(format!(
                "unknown strategy {:?} (expected notify-only or state-mutating)",
                other
            )),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::NotifyOnly => f.write_str("notify-only"),
            StrategyKind::StateMutating => f.write_str("state-mutating"),
        }
    }
}

/// Complete runtime configuration.
#[derive(Clone)]
pub struct HeraldConfig {
    /// Indexer HTTP base URL
    pub chronik_url: String,
    /// Indexer websocket URL
    pub chronik_ws_url: String,
    /// Address whose script is subscribed
    pub address: String,
    pub telegram_bot_token: String,
    pub telegram_channel_id: String,
    pub telegram_api_url: String,
    /// Base for block links in messages
    pub explorer_url: String,
    pub avalanche: AvalancheRpcConfig,
    pub block_strategy: StrategyKind,
    /// State-mutating strategy only: announce each processed block
    pub announce_finalized: bool,
}

impl fmt::Debug for HeraldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeraldConfig")
            .field("chronik_url", &self.chronik_url)
            .field("chronik_ws_url", &self.chronik_ws_url)
            .field("address", &self.address)
            .field("telegram_bot_token", &"<redacted>")
            .field("telegram_channel_id", &self.telegram_channel_id)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("explorer_url", &self.explorer_url)
            .field("avalanche", &self.avalanche)
            .field("block_strategy", &self.block_strategy)
            .field("announce_finalized", &self.announce_finalized)
            .finish()
    }
}

impl HeraldConfig {
    /// Load and validate from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load and validate from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Empty values count as unset
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing { var: key });

        let chronik_url = var("HERALD_CHRONIK_URL")
            .unwrap_or_else(|| DEFAULT_CHRONIK_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let chronik_ws_url = match var("HERALD_CHRONIK_WS_URL") {
            Some(url) => url,
            None => derive_ws_url(&chronik_url)?,
        };

        let mut avalanche = AvalancheRpcConfig::new(
            var("HERALD_AVALANCHE_RPC_URL").unwrap_or_else(|| AvalancheRpcConfig::default().url),
        );
        avalanche.username = var("HERALD_AVALANCHE_RPC_USER");
        avalanche.password = var("HERALD_AVALANCHE_RPC_PASSWORD");
        avalanche.timeout_ms = match var("HERALD_AVALANCHE_TIMEOUT_MS") {
            Some(raw) => parse_var("HERALD_AVALANCHE_TIMEOUT_MS", &raw)?,
            None => DEFAULT_TIMEOUT_MS,
        };

        let block_strategy = match var("HERALD_BLOCK_STRATEGY") {
            Some(raw) => parse_var("HERALD_BLOCK_STRATEGY", &raw)?,
            None => StrategyKind::default(),
        };
        let announce_finalized = match var("HERALD_ANNOUNCE_FINALIZED") {
            Some(raw) => parse_flag("HERALD_ANNOUNCE_FINALIZED", &raw)?,
            None => false,
        };

        let config = Self {
            chronik_url,
            chronik_ws_url,
            address: required("HERALD_ADDRESS")?,
            telegram_bot_token: required("HERALD_TELEGRAM_BOT_TOKEN")?,
            telegram_channel_id: required("HERALD_TELEGRAM_CHANNEL_ID")?,
            telegram_api_url: var("HERALD_TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            explorer_url: var("HERALD_EXPLORER_URL")
                .unwrap_or_else(|| DEFAULT_EXPLORER_URL.to_string()),
            avalanche,
            block_strategy,
            announce_finalized,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values no adapter could work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (var, value) in [
            ("HERALD_ADDRESS", &self.address),
            ("HERALD_TELEGRAM_BOT_TOKEN", &self.telegram_bot_token),
            ("HERALD_TELEGRAM_CHANNEL_ID", &self.telegram_channel_id),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing { var });
            }
        }
        if self.avalanche.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                var: "HERALD_AVALANCHE_TIMEOUT_MS",
                value: "0".to_string(),
                reason: "timeout must be positive".to_string(),
            });
        }
        if !(self.chronik_ws_url.starts_with("ws://") || self.chronik_ws_url.starts_with("wss://"))
        {
            return Err(ConfigError::Invalid {
                var: "HERALD_CHRONIK_WS_URL",
                value: self.chronik_ws_url.clone(),
                reason: "expected a ws:// or wss:// url".to_string(),
            });
        }
        Ok(())
    }
}

/// `https://host/path` → `wss://host/path/ws`
fn derive_ws_url(chronik_url: &str) -> Result<String, ConfigError> {
    let rest = if let Some(rest) = chronik_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = chronik_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        return Err(ConfigError::Invalid {
            var: "HERALD_CHRONIK_URL",
            value: chronik_url.to_string(),
            reason: "expected an http:// or https:// url".to_string(),
        });
    };
    Ok(format!("{}/ws", rest.trim_end_matches('/')))
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
