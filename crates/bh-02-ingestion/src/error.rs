//! Error types for the ingestion subsystem

use thiserror::Error;

/// Ingestion subsystem errors
///
/// None of these escape a single message's processing: the dispatcher's gate
/// boundary logs them and reports `false`.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Websocket connect or frame delivery failed
    #[error("Transport error: {reason}")]
    Transport { reason: String },

    /// Address could not be turned into a subscription target
    #[error("Cannot decode address {address}: {reason}")]
    AddressDecode { address: String, reason: String },

    /// Block details could not be retrieved
    #[error("Indexer error for block {block_hash}: {reason}")]
    Indexer { block_hash: String, reason: String },

    /// Human-readable block summary could not be built
    #[error("Message synthesis failed: {reason}")]
    MessageSynthesis { reason: String },

    /// Outbound notification was not delivered
    #[error("Notification error: {reason}")]
    Notification { reason: String },

    /// Persistence collaborator failed
    #[error("Storage error: {reason}")]
    Storage { reason: String },
}

/// Result type for ingestion operations
pub type IngestionResult<T> = Result<T, IngestionError>;
