//! Driving Port (API - Inbound)

use async_trait::async_trait;

/// Fail-safe finality check.
///
/// Implementations never return an error: anything short of an explicit
/// `true` from the remote node is `false`.
#[async_trait]
pub trait FinalityOracle: Send + Sync {
    /// Whether `block_hash` (64 lowercase hex chars) has been finalized.
    async fn is_final(&self, block_hash: &str) -> bool;
}
