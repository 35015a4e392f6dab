//! Block and subscription value types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The subset of the indexer's block view this subsystem consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDetails {
    pub hash: String,
    pub height: u64,
    /// Unix seconds
    pub timestamp: i64,
    #[serde(default)]
    pub num_txs: u64,
    #[serde(default)]
    pub size: u64,
}

/// Last block whose effects were persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTip {
    pub height: u64,
    pub hash: String,
}

impl From<&BlockDetails> for ChainTip {
    fn from(block: &BlockDetails) -> Self {
        Self {
            height: block.height,
            hash: block.hash.clone(),
        }
    }
}

/// Output script template of a subscribed address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptType {
    P2pkh,
    P2sh,
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptType::P2pkh => f.write_str("p2pkh"),
            ScriptType::P2sh => f.write_str("p2sh"),
        }
    }
}

/// (script type, script hash) pair decoded once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionTarget {
    pub script_type: ScriptType,
    /// Lowercase hex
    pub script_hash: String,
}
