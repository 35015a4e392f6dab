//! # bh-02-ingestion
//!
//! Event ingestion for an indexer websocket feed.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **Subscription Manager**: connect, wait for open, subscribe to one script
//! - **Event Classifier**: closed sum type over inbound frames, total
//! - **Concurrency Gate**: keyed FIFO mutual exclusion
//! - **Serialized Block Handler**: state-mutating or notify-only strategy
//!
//! ## Architecture
//!
//! ```text
//! WsTransport ──frame──→ EventDispatcher::dispatch
//!                              │ classify
//!          ┌───────────────────┼──────────────────────────┐
//!          ▼                   ▼                          ▼
//!   BlockConnected     AddedToMempool / Confirmed      Unknown
//!          │                   │                          │
//!   gate.enqueue(key)        log                        log
//!          │
//!   spawn: ticket.wait → SerializedBlockHandler::handle → release
//!                              │
//!          IndexerClient, ServerStateStore, Notifier, FinalityOracle
//! ```
//!
//! A failure in one frame's handling is logged and reported as `false`; it
//! never stops later frames from being processed.
//!
//! ## Example
//!
//! ```rust,ignore
//! use bh_02_ingestion::{ConcurrencyGate, EventDispatcher, SubscriptionManager};
//!
//! let dispatcher = EventDispatcher::new(ConcurrencyGate::new(), Arc::new(handler));
//! let manager = SubscriptionManager::new(dispatcher);
//! let connection = manager.open(&WsTransport::new(ws_url), &target).await?;
//! ```

#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod dispatcher;
pub mod domain;
pub mod error;
pub mod handler;
pub mod ports;
pub mod service;

pub use dispatcher::{Dispatch, EventDispatcher, BLOCK_CONNECTED_GATE};
pub use domain::{
    BlockDetails, ChainTip, ConcurrencyGate, EventEnvelope, EventKind, MessageOptions, ScriptType,
    SubscriptionTarget,
};
pub use error::{IngestionError, IngestionResult};
pub use handler::{
    BlockProcessor, BlockStrategy, FinalizedTipProcessor, HandlerContext, NotifyOnlyConfig,
    SerializedBlockHandler,
};
pub use service::SubscriptionManager;
