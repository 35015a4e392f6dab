//! # Adapters Layer (Hexagonal Architecture)
//!
//! Concrete implementations of the outbound ports.

mod cashaddr;
mod chronik_http;
mod memory_store;
mod telegram;
mod ws_transport;

pub use cashaddr::{CashAddrDecoder, DEFAULT_PREFIX};
pub use chronik_http::ChronikHttpClient;
pub use memory_store::InMemoryStateStore;
pub use telegram::TelegramNotifier;
pub use ws_transport::{WsConnection, WsTransport};

use std::time::Duration;
use tracing::warn;

/// reqwest client with a whole-request timeout.
fn http_client(timeout: Duration) -> reqwest::Client {
    match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "HTTP client build failed, requests will have no timeout");
            reqwest::Client::new()
        }
    }
}
