//! # Domain Layer
//!
//! Pure ingestion logic with no I/O:
//!
//! - [`envelope`] - closed sum type of inbound events and the classifier
//! - [`gate`] - keyed FIFO mutual exclusion for the block critical section
//! - [`block`] - indexer block view, processed tip, subscription target
//! - [`message`] - notification text synthesis

pub mod block;
pub mod envelope;
pub mod gate;
pub mod message;

pub use block::{BlockDetails, ChainTip, ScriptType, SubscriptionTarget};
pub use envelope::{is_hex_hash, EventEnvelope, EventKind};
pub use gate::{ConcurrencyGate, GateGuard, GateTicket};
pub use message::{
    block_summary_message, fallback_block_message, finalized_block_message, MessageOptions,
};
