//! Error types for the Finality Oracle
//!
//! These never cross the oracle's public boundary: `FinalityOracle::is_final`
//! logs them and answers `false`.

use crate::domain::RpcErrorObject;
use thiserror::Error;

/// Finality check errors
#[derive(Debug, Error)]
pub enum FinalityError {
    /// Well-formed error response from the node (e.g. malformed block hash)
    #[error("Node error from isFinalBlock {0}")]
    Node(RpcErrorObject),

    /// The call did not complete within the configured timeout
    #[error("timeout of {timeout_ms}ms exceeded")]
    Timeout { timeout_ms: u64 },

    /// Connection refused, reset, TLS failure, ...
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Body was not a JSON-RPC response we understand
    #[error("Malformed response: {reason}")]
    MalformedResponse { reason: String },
}

/// Result type for finality operations
pub type FinalityResult<T> = Result<T, FinalityError>;
