//! Subscription Manager - websocket lifecycle.
//!
//! ```text
//! open(transport, target)
//!   ├─ open_connection(on_message = dispatcher.dispatch)
//!   ├─ wait_until_open            (unbounded wait)
//!   ├─ log "Connected to websocket"
//!   └─ subscribe(target)
//! ```

use crate::dispatcher::EventDispatcher;
use crate::domain::SubscriptionTarget;
use crate::error::IngestionResult;
use crate::ports::{EventTransport, MessageCallback, TransportConnection};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub struct SubscriptionManager {
    dispatcher: EventDispatcher,
}

impl SubscriptionManager {
    pub fn new(dispatcher: EventDispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Callback forwarding every inbound frame to the dispatcher.
    pub fn message_callback(&self) -> MessageCallback {
        let dispatcher = self.dispatcher.clone();
        Arc::new(move |raw: Value| {
            dispatcher.dispatch(&raw);
        })
    }

    /// Connect, wait for the transport to report open, then subscribe.
    ///
    /// Never returns if the connection never opens.
    pub async fn open<T: EventTransport>(
        &self,
        transport: &T,
        target: &SubscriptionTarget,
    ) -> IngestionResult<T::Connection> {
        let connection = transport.open_connection(self.message_callback()).await?;
        connection.wait_until_open().await;
        info!("Connected to websocket");

        connection.subscribe(target).await?;
        info!(
            script_type = %target.script_type,
            script_hash = %target.script_hash,
            "Subscribed to script"
        );
        Ok(connection)
    }
}
