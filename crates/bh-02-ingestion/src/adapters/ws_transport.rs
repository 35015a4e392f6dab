//! Websocket feed adapter (tokio-tungstenite).
//!
//! ```text
//! open_connection ──spawn──→ connect_async ──→ open = true
//!                                   │
//!                   ┌───────── select loop ─────────┐
//!                   │ outbound rx  → write.send     │
//!                   │ Text frame   → on_message     │
//!                   │ Ping         → Pong           │
//!                   │ Close / Err  → exit           │
//!                   └───────────────────────────────┘
//! ```
//!
//! One connection, no reconnection.

use crate::domain::SubscriptionTarget;
use crate::error::{IngestionError, IngestionResult};
use crate::ports::{EventTransport, MessageCallback, TransportConnection};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscribeRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    target: &'a SubscriptionTarget,
}

#[derive(Debug, Clone)]
pub struct WsTransport {
    url: String,
}

impl WsTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl EventTransport for WsTransport {
    type Connection = WsConnection;

    async fn open_connection(&self, on_message: MessageCallback) -> IngestionResult<WsConnection> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(IngestionError::Transport {
                reason: format!("not a websocket url: {}", self.url),
            });
        }

        let (open_tx, open_rx) = watch::channel(false);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_connection(
            self.url.clone(),
            on_message,
            open_tx,
            outbound_rx,
        ));

        Ok(WsConnection {
            open: open_rx,
            outbound: outbound_tx,
            task,
        })
    }
}

/// Live websocket handle. Dropping it closes the socket.
pub struct WsConnection {
    open: watch::Receiver<bool>,
    outbound: mpsc::UnboundedSender<Message>,
    task: JoinHandle<()>,
}

impl WsConnection {
    pub fn is_open(&self) -> bool {
        *self.open.borrow()
    }

    /// True once the read loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[async_trait]
impl TransportConnection for WsConnection {
    async fn wait_until_open(&self) {
        let mut open = self.open.clone();
        if open.wait_for(|is_open| *is_open).await.is_err() {
            // Connect failed and the task is gone; never report open.
            std::future::pending::<()>().await;
        }
    }

    async fn subscribe(&self, target: &SubscriptionTarget) -> IngestionResult<()> {
        let request = SubscribeRequest {
            kind: "subscribe",
            target,
        };
        let text = serde_json::to_string(&request).map_err(|e| IngestionError::Transport {
            reason: e.to_string(),
        })?;

        self.outbound
            .send(Message::Text(text.into()))
            .map_err(|_| IngestionError::Transport {
                reason: "websocket connection closed".to_string(),
            })
    }
}

async fn run_connection(
    url: String,
    on_message: MessageCallback,
    open_tx: watch::Sender<bool>,
    mut outbound_rx: mpsc::UnboundedReceiver<Message>,
) {
    let ws_stream = match connect_async(url.as_str()).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            error!(url = %url, error = %e, "Failed to connect to websocket");
            return;
        }
    };
    let _ = open_tx.send(true);
    debug!(url = %url, "Websocket handshake complete");

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => match outbound {
                Some(msg) => {
                    if let Err(e) = write.send(msg).await {
                        error!(error = %e, "Websocket write failed");
                        break;
                    }
                }
                None => {
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
            },
            inbound = read.next() => match inbound {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<Value>(text.as_str()) {
                    Ok(value) => on_message(value),
                    Err(e) => warn!(error = %e, "Ignoring non-JSON websocket frame"),
                },
                Some(Ok(Message::Ping(data))) => {
                    if let Err(e) = write.send(Message::Pong(data)).await {
                        error!(error = %e, "Websocket write failed");
                        break;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    info!(?frame, "Websocket closed by server");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!(error = %e, "Websocket read failed");
                    break;
                }
                None => break,
            },
        }
    }
}
