//! # bh-01-finality
//!
//! Finality Oracle answering "has the pre-consensus layer finalized this
//! block?" with a fail-safe boolean.
//!
//! ## Overview
//!
//! The oracle issues exactly one `isfinalblock` JSON-RPC call per question and
//! never raises. Every failure mode collapses to `false`:
//!
//! ```text
//!                    ┌──────────────────────────────┐
//!   is_final(hash) → │ POST {method: isfinalblock}  │ ── bounded by timeout
//!                    └──────────────┬───────────────┘
//!                                   │
//!        ┌──────────────────────────┼───────────────────────────┐
//!        ▼                          ▼                           ▼
//!  {result: b, error: null}   {error: {code, message}}   timeout / transport /
//!        │                          │                     malformed body
//!        ▼                          ▼                           ▼
//!     return b             warn!(error) → false        error!(hash, err) → false
//! ```
//!
//! "Can't confirm" is treated exactly like "not final": consumers must never
//! act on a block prematurely.
//!
//! ## Example
//!
//! ```rust,ignore
//! use bh_01_finality::{AvalancheFinalityOracle, AvalancheRpcConfig, FinalityOracle};
//!
//! let oracle = AvalancheFinalityOracle::new(AvalancheRpcConfig::default());
//! if oracle.is_final(&block_hash).await {
//!     // safe to treat the block as irreversible
//! }
//! ```

#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use config::{AvalancheRpcConfig, DEFAULT_TIMEOUT_MS};
pub use domain::{FinalityRequest, FinalityResponse, RpcErrorObject, IS_FINAL_BLOCK_METHOD};
pub use error::{FinalityError, FinalityResult};
pub use ports::inbound::FinalityOracle;
pub use service::AvalancheFinalityOracle;
