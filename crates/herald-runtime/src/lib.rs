//! # Block Herald Runtime
//!
//! Library half of the `block-herald` binary.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging (`herald-telemetry`)
//! 2. Load and validate [`HeraldConfig`] from the environment
//! 3. Decode the subscribed address once
//! 4. Build adapters and the configured block strategy
//! 5. Open the feed subscription ([`HeraldRuntime::start`])
//! 6. Run until Ctrl+C

pub mod config;
pub mod wiring;

pub use config::{ConfigError, HeraldConfig, StrategyKind};
pub use wiring::{build_context, build_strategy, HeraldRuntime};
