//! Notification text for block events.

use crate::domain::block::BlockDetails;
use crate::error::{IngestionError, IngestionResult};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Delivery options passed through to the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageOptions {
    pub parse_mode: Option<String>,
    pub disable_web_page_preview: bool,
}

impl Default for MessageOptions {
    fn default() -> Self {
        Self {
            parse_mode: Some("markdown".to_string()),
            disable_web_page_preview: true,
        }
    }
}

fn explorer_link(explorer_url: &str, block_hash: &str) -> String {
    format!(
        "[explorer]({}/block/{})",
        explorer_url.trim_end_matches('/'),
        block_hash
    )
}

/// Human-readable summary of a freshly connected block.
///
/// Fails if the details do not describe `block_hash` or carry an
/// unrepresentable timestamp; callers fall back to
/// [`fallback_block_message`].
pub fn block_summary_message(
    block: &BlockDetails,
    block_hash: &str,
    explorer_url: &str,
) -> IngestionResult<String> {
    if !block.hash.eq_ignore_ascii_case(block_hash) {
        return Err(IngestionError::MessageSynthesis {
            reason: format!("indexer returned block {} for {}", block.hash, block_hash),
        });
    }
    let mined_at = DateTime::from_timestamp(block.timestamp, 0).ok_or_else(|| {
        IngestionError::MessageSynthesis {
            reason: format!("timestamp {} out of range", block.timestamp),
        }
    })?;

    Ok(format!(
        "New Block Found\n\
         \n\
         {height}\n\
         \n\
         {hash}\n\
         \n\
         {txs} transactions, {size} bytes\n\
         Mined at {mined_at}\n\
         \n\
         {link}",
        height = block.height,
        hash = block_hash,
        txs = block.num_txs,
        size = block.size,
        mined_at = mined_at.format("%Y-%m-%d %H:%M:%S UTC"),
        link = explorer_link(explorer_url, block_hash),
    ))
}

/// Minimal message carrying only the hash and a link.
pub fn fallback_block_message(block_hash: &str, explorer_url: &str) -> String {
    format!(
        "New Block Found\n\n{}\n\n{}",
        block_hash,
        explorer_link(explorer_url, block_hash)
    )
}

/// Announcement sent by the state-mutating strategy once a block is processed.
pub fn finalized_block_message(block: &BlockDetails, explorer_url: &str) -> String {
    format!(
        "Block {} finalized\n\n{}\n\n{}",
        block.height,
        block.hash,
        explorer_link(explorer_url, &block.hash)
    )
}
