//! Driven Ports (SPI - Outbound Dependencies)

use crate::domain::{BlockDetails, ChainTip, MessageOptions, SubscriptionTarget};
use crate::error::IngestionResult;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Callback invoked once per inbound frame, in arrival order.
///
/// Must not block: it runs on the transport's read loop.
pub type MessageCallback = Arc<dyn Fn(Value) + Send + Sync>;

/// Websocket feed of indexer events.
///
/// Reconnection is not part of this contract.
#[async_trait]
pub trait EventTransport: Send + Sync {
    type Connection: TransportConnection;

    /// Start connecting; frames are delivered to `on_message` once open.
    async fn open_connection(&self, on_message: MessageCallback)
        -> IngestionResult<Self::Connection>;
}

/// Live connection handle.
#[async_trait]
pub trait TransportConnection: Send + Sync {
    /// Suspend until the transport signals open. No timeout: if the
    /// connection never opens this never returns.
    async fn wait_until_open(&self);

    /// Ask the feed for events touching `target`'s script.
    async fn subscribe(&self, target: &SubscriptionTarget) -> IngestionResult<()>;
}

/// Address → (script type, script hash); used once at startup.
pub trait AddressDecoder: Send + Sync {
    fn decode(&self, address: &str) -> IngestionResult<SubscriptionTarget>;
}

/// Indexer queries.
#[async_trait]
pub trait IndexerClient: Send + Sync {
    async fn block(&self, block_hash: &str) -> IngestionResult<BlockDetails>;
}

/// Outbound chat notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        channel_id: &str,
        message: &str,
        options: &MessageOptions,
    ) -> IngestionResult<()>;
}

/// Server state touched by the state-mutating block strategy.
#[async_trait]
pub trait ServerStateStore: Send + Sync {
    async fn processed_tip(&self) -> IngestionResult<Option<ChainTip>>;

    async fn save_processed_tip(&self, tip: ChainTip) -> IngestionResult<()>;
}
