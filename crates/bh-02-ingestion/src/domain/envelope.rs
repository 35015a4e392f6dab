//! Inbound event envelopes and their classification.

use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// One classified inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventEnvelope {
    BlockConnected { block_hash: String },
    AddedToMempool { txid: String },
    Confirmed { txid: String },
    /// Unrecognized tag, missing field or malformed hash.
    Unknown { raw: Value },
}

/// Discriminator of [`EventEnvelope`], for logging and dispatch reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    BlockConnected,
    AddedToMempool,
    Confirmed,
    Unknown,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::BlockConnected => "BlockConnected",
            EventKind::AddedToMempool => "AddedToMempool",
            EventKind::Confirmed => "Confirmed",
            EventKind::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Wire shape of the known kinds; extra fields are ignored.
#[derive(Deserialize)]
#[serde(tag = "type")]
enum KnownEvent {
    BlockConnected {
        #[serde(rename = "blockHash")]
        block_hash: String,
    },
    AddedToMempool {
        txid: String,
    },
    Confirmed {
        txid: String,
    },
}

impl EventEnvelope {
    /// Classify a raw frame. Total: anything unrecognized is `Unknown`.
    pub fn classify(raw: &Value) -> Self {
        let known = match KnownEvent::deserialize(raw) {
            Ok(known) => known,
            Err(_) => return Self::unknown(raw),
        };

        match known {
            KnownEvent::BlockConnected { block_hash } if is_hex_hash(&block_hash) => {
                EventEnvelope::BlockConnected {
                    block_hash: block_hash.to_ascii_lowercase(),
                }
            }
            KnownEvent::AddedToMempool { txid } if is_hex_hash(&txid) => {
                EventEnvelope::AddedToMempool {
                    txid: txid.to_ascii_lowercase(),
                }
            }
            KnownEvent::Confirmed { txid } if is_hex_hash(&txid) => EventEnvelope::Confirmed {
                txid: txid.to_ascii_lowercase(),
            },
            _ => Self::unknown(raw),
        }
    }

    fn unknown(raw: &Value) -> Self {
        EventEnvelope::Unknown { raw: raw.clone() }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            EventEnvelope::BlockConnected { .. } => EventKind::BlockConnected,
            EventEnvelope::AddedToMempool { .. } => EventKind::AddedToMempool,
            EventEnvelope::Confirmed { .. } => EventKind::Confirmed,
            EventEnvelope::Unknown { .. } => EventKind::Unknown,
        }
    }
}

/// 64 hex characters (either case).
pub fn is_hex_hash(candidate: &str) -> bool {
    candidate.len() == 64 && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}
