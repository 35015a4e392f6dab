//! # Wiring
//!
//! Builds the adapters named by [`HeraldConfig`] and plugs them into the
//! ingestion subsystem:
//!
//! ```text
//! CashAddrDecoder ──target──┐
//!                           ▼
//! WsTransport ──→ SubscriptionManager ──→ EventDispatcher ──→ SerializedBlockHandler
//!                                                                   │
//!        ChronikHttpClient, InMemoryStateStore, TelegramNotifier,  ◄┘
//!        AvalancheFinalityOracle
//! ```

use crate::config::{HeraldConfig, StrategyKind};
use anyhow::{Context, Result};
use bh_01_finality::AvalancheFinalityOracle;
use bh_02_ingestion::adapters::{
    CashAddrDecoder, ChronikHttpClient, InMemoryStateStore, TelegramNotifier, WsConnection,
    WsTransport,
};
use bh_02_ingestion::ports::AddressDecoder;
use bh_02_ingestion::{
    BlockStrategy, ConcurrencyGate, EventDispatcher, FinalizedTipProcessor, HandlerContext,
    MessageOptions, NotifyOnlyConfig, SerializedBlockHandler, SubscriptionManager,
    SubscriptionTarget,
};
use std::sync::Arc;
use tracing::info;

/// Handler collaborators for `config`.
pub fn build_context(config: &HeraldConfig) -> HandlerContext {
    HandlerContext {
        indexer: Arc::new(ChronikHttpClient::new(config.chronik_url.clone())),
        store: Arc::new(InMemoryStateStore::new()),
        notifier: Arc::new(TelegramNotifier::new(
            config.telegram_api_url.clone(),
            config.telegram_bot_token.clone(),
        )),
        finality: Arc::new(AvalancheFinalityOracle::new(config.avalanche.clone())),
        channel_id: config.telegram_channel_id.clone(),
        message_options: MessageOptions::default(),
    }
}

pub fn build_strategy(config: &HeraldConfig) -> BlockStrategy {
    match config.block_strategy {
        StrategyKind::NotifyOnly => BlockStrategy::NotifyOnly(NotifyOnlyConfig {
            explorer_url: config.explorer_url.clone(),
        }),
        StrategyKind::StateMutating => BlockStrategy::StateMutating(Arc::new(
            FinalizedTipProcessor::new(config.announce_finalized, config.explorer_url.clone()),
        )),
    }
}

/// The assembled process.
pub struct HeraldRuntime {
    config: HeraldConfig,
    target: SubscriptionTarget,
    manager: SubscriptionManager,
}

impl HeraldRuntime {
    /// Decode the subscribed address and build every component.
    pub fn new(config: HeraldConfig) -> Result<Self> {
        let target = CashAddrDecoder::default()
            .decode(&config.address)
            .context("Failed to decode HERALD_ADDRESS")?;

        let handler = SerializedBlockHandler::new(build_context(&config), build_strategy(&config));
        let dispatcher = EventDispatcher::new(ConcurrencyGate::new(), Arc::new(handler));

        Ok(Self {
            config,
            target,
            manager: SubscriptionManager::new(dispatcher),
        })
    }

    pub fn config(&self) -> &HeraldConfig {
        &self.config
    }

    pub fn target(&self) -> &SubscriptionTarget {
        &self.target
    }

    /// Open the feed subscription. Blocks until the websocket is open.
    pub async fn start(&self) -> Result<WsConnection> {
        info!("===========================================");
        info!("  Block Herald v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");
        info!(
            strategy = %self.config.block_strategy,
            ws_url = %self.config.chronik_ws_url,
            script_type = %self.target.script_type,
            script_hash = %self.target.script_hash,
            "Starting subscription"
        );

        let transport = WsTransport::new(self.config.chronik_ws_url.clone());
        self.manager
            .open(&transport, &self.target)
            .await
            .context("Failed to open websocket subscription")
    }
}
