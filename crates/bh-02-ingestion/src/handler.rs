//! # Serialized Block Handler
//!
//! The critical-section body run for every `BlockConnected` event while the
//! dispatcher holds the gate. Two strategies, never both active:
//!
//! ```text
//! StateMutating ──→ BlockProcessor::process(ctx, hash)        (Err → gate boundary)
//!
//! NotifyOnly ──→ indexer.block(hash) ──→ summary message ─┐
//!                      │ Err                │ Err         │
//!                      └────→ fallback message ←──────────┘
//!                                     │
//!                              notifier.send ──Err──→ log, false
//! ```

use crate::domain::{
    block_summary_message, fallback_block_message, finalized_block_message, ChainTip,
    MessageOptions,
};
use crate::error::IngestionResult;
use crate::ports::{FinalityOracle, IndexerClient, Notifier, ServerStateStore};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Collaborators passed to every handler invocation.
#[derive(Clone)]
pub struct HandlerContext {
    pub indexer: Arc<dyn IndexerClient>,
    pub store: Arc<dyn ServerStateStore>,
    pub notifier: Arc<dyn Notifier>,
    pub finality: Arc<dyn FinalityOracle>,
    pub channel_id: String,
    pub message_options: MessageOptions,
}

/// Domain processing for the state-mutating strategy.
///
/// Returning `Err` (or panicking) is allowed: the dispatcher's gate boundary
/// logs it with the block hash and reports `false`.
#[async_trait]
pub trait BlockProcessor: Send + Sync {
    async fn process(&self, ctx: &HandlerContext, block_hash: &str) -> IngestionResult<bool>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyOnlyConfig {
    pub explorer_url: String,
}

impl Default for NotifyOnlyConfig {
    fn default() -> Self {
        Self {
            explorer_url: "https://explorer.e.cash".to_string(),
        }
    }
}

/// Selected once at startup.
#[derive(Clone)]
pub enum BlockStrategy {
    StateMutating(Arc<dyn BlockProcessor>),
    NotifyOnly(NotifyOnlyConfig),
}

impl BlockStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            BlockStrategy::StateMutating(_) => "state-mutating",
            BlockStrategy::NotifyOnly(_) => "notify-only",
        }
    }
}

pub struct SerializedBlockHandler {
    context: HandlerContext,
    strategy: BlockStrategy,
}

impl SerializedBlockHandler {
    pub fn new(context: HandlerContext, strategy: BlockStrategy) -> Self {
        Self { context, strategy }
    }

    pub fn context(&self) -> &HandlerContext {
        &self.context
    }

    pub fn strategy(&self) -> &BlockStrategy {
        &self.strategy
    }

    /// Handle one connected block. Caller must hold the gate.
    pub async fn handle(&self, block_hash: &str) -> IngestionResult<bool> {
        match &self.strategy {
            BlockStrategy::StateMutating(processor) => {
                processor.process(&self.context, block_hash).await
            }
            BlockStrategy::NotifyOnly(config) => Ok(self.notify(config, block_hash).await),
        }
    }

    async fn notify(&self, config: &NotifyOnlyConfig, block_hash: &str) -> bool {
        let message = match self.summarize(config, block_hash).await {
            Ok(message) => message,
            Err(e) => {
                warn!(block_hash = %block_hash, error = %e, "Block summary unavailable, sending fallback");
                fallback_block_message(block_hash, &config.explorer_url)
            }
        };

        match self
            .context
            .notifier
            .send(&self.context.channel_id, &message, &self.context.message_options)
            .await
        {
            Ok(()) => {
                debug!(block_hash = %block_hash, "Block notification sent");
                true
            }
            Err(e) => {
                warn!(block_hash = %block_hash, error = %e, "Failed to send block notification");
                false
            }
        }
    }

    async fn summarize(&self, config: &NotifyOnlyConfig, block_hash: &str) -> IngestionResult<String> {
        let block = self.context.indexer.block(block_hash).await?;
        block_summary_message(&block, block_hash, &config.explorer_url)
    }
}

/// Default state-mutating processor: records the highest finalized block as
/// the processed tip, optionally announcing it.
#[derive(Debug, Clone, Default)]
pub struct FinalizedTipProcessor {
    pub announce: bool,
    pub explorer_url: String,
}

impl FinalizedTipProcessor {
    pub fn new(announce: bool, explorer_url: impl Into<String>) -> Self {
        Self {
            announce,
            explorer_url: explorer_url.into(),
        }
    }
}

#[async_trait]
impl BlockProcessor for FinalizedTipProcessor {
    async fn process(&self, ctx: &HandlerContext, block_hash: &str) -> IngestionResult<bool> {
        if !ctx.finality.is_final(block_hash).await {
            info!(block_hash = %block_hash, "Block not yet final, skipping");
            return Ok(false);
        }

        let block = ctx.indexer.block(block_hash).await?;

        if let Some(tip) = ctx.store.processed_tip().await? {
            if tip.height >= block.height {
                info!(
                    block_hash = %block_hash,
                    height = block.height,
                    tip_height = tip.height,
                    "Block already processed"
                );
                return Ok(false);
            }
        }

        ctx.store.save_processed_tip(ChainTip::from(&block)).await?;
        info!(block_hash = %block_hash, height = block.height, "Processed tip advanced");

        if self.announce {
            let message = finalized_block_message(&block, &self.explorer_url);
            if let Err(e) = ctx
                .notifier
                .send(&ctx.channel_id, &message, &ctx.message_options)
                .await
            {
                warn!(block_hash = %block_hash, error = %e, "Failed to announce finalized block");
            }
        }

        Ok(true)
    }
}
