//! Per-message dispatch: classify, then gate `BlockConnected` handling.
//!
//! The gate ticket is taken synchronously inside [`EventDispatcher::dispatch`],
//! before the handling task is spawned, so block events are served in the
//! order their frames arrived.

use crate::domain::{ConcurrencyGate, EventEnvelope, EventKind};
use crate::handler::SerializedBlockHandler;
use futures::FutureExt;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Gate key shared by every block-connected handler invocation.
pub const BLOCK_CONNECTED_GATE: &str = "handleBlockConnected";

/// What [`EventDispatcher::dispatch`] did with a frame.
#[derive(Debug)]
pub enum Dispatch {
    /// Queued behind the gate; the task resolves to the handler's outcome.
    Serialized {
        block_hash: String,
        task: JoinHandle<bool>,
    },
    /// Logged only.
    Observed(EventKind),
}

#[derive(Clone)]
pub struct EventDispatcher {
    gate: ConcurrencyGate,
    handler: Arc<SerializedBlockHandler>,
}

impl EventDispatcher {
    pub fn new(gate: ConcurrencyGate, handler: Arc<SerializedBlockHandler>) -> Self {
        Self { gate, handler }
    }

    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, raw: &Value) -> Dispatch {
        let envelope = EventEnvelope::classify(raw);
        let kind = envelope.kind();

        match envelope {
            EventEnvelope::BlockConnected { block_hash } => {
                info!(kind = %kind, block_hash = %block_hash, "Event received");
                let ticket = self.gate.enqueue(BLOCK_CONNECTED_GATE);
                let handler = Arc::clone(&self.handler);
                let hash = block_hash.clone();

                let task = tokio::spawn(async move {
                    let _guard = ticket.wait().await;
                    guarded_handle(&handler, &hash).await
                });

                Dispatch::Serialized { block_hash, task }
            }
            EventEnvelope::AddedToMempool { txid } | EventEnvelope::Confirmed { txid } => {
                info!(kind = %kind, txid = %txid, "Event received");
                Dispatch::Observed(kind)
            }
            EventEnvelope::Unknown { raw } => {
                debug!(kind = %kind, raw = %raw, "Event received");
                Dispatch::Observed(kind)
            }
        }
    }
}

/// Gate boundary: neither an `Err` nor a panic escapes.
async fn guarded_handle(handler: &SerializedBlockHandler, block_hash: &str) -> bool {
    match AssertUnwindSafe(handler.handle(block_hash))
        .catch_unwind()
        .await
    {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            error!(block_hash = %block_hash, error = %e, "Error handling block connected");
            false
        }
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(block_hash = %block_hash, panic = %reason, "Block handler panicked");
            false
        }
    }
}
