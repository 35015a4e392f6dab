//! Shared fixtures for the ingestion integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use bh_01_finality::FinalityOracle;
use bh_02_ingestion::adapters::InMemoryStateStore;
use bh_02_ingestion::ports::{IndexerClient, Notifier};
use bh_02_ingestion::{
    BlockDetails, BlockProcessor, BlockStrategy, ConcurrencyGate, EventDispatcher, HandlerContext,
    IngestionError, IngestionResult, MessageOptions, SerializedBlockHandler,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::fmt::MakeWriter;

pub fn block_hash(n: u8) -> String {
    format!("{:0>62}{:02x}", "", n)
}

pub fn block_connected(hash: &str) -> Value {
    json!({"type": "BlockConnected", "blockHash": hash})
}

/// Processor that records entry and exit of the critical section.
#[derive(Default)]
pub struct RecordingProcessor {
    pub events: Mutex<Vec<String>>,
    pub work: Duration,
    pub fail_on: Option<String>,
    /// Only the first run for `fail_on` fails.
    pub fail_once: bool,
    pub panic_on: Option<String>,
}

impl RecordingProcessor {
    pub fn with_work(work: Duration) -> Self {
        Self {
            work,
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl BlockProcessor for RecordingProcessor {
    async fn process(&self, _ctx: &HandlerContext, block_hash: &str) -> IngestionResult<bool> {
        self.events.lock().push(format!("start {}", block_hash));
        tokio::time::sleep(self.work).await;

        if self.panic_on.as_deref() == Some(block_hash) {
            panic!("processor blew up on {}", block_hash);
        }
        let fail = format!("fail {}", block_hash);
        let already_failed = self.events.lock().contains(&fail);
        if self.fail_on.as_deref() == Some(block_hash) && !(self.fail_once && already_failed) {
            self.events.lock().push(fail);
            return Err(IngestionError::Storage {
                reason: "disk full".to_string(),
            });
        }

        self.events.lock().push(format!("end {}", block_hash));
        Ok(true)
    }
}

pub struct NoIndexer;

#[async_trait]
impl IndexerClient for NoIndexer {
    async fn block(&self, block_hash: &str) -> IngestionResult<BlockDetails> {
        Err(IngestionError::Indexer {
            block_hash: block_hash.to_string(),
            reason: "unavailable".to_string(),
        })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        _channel_id: &str,
        message: &str,
        _options: &MessageOptions,
    ) -> IngestionResult<()> {
        self.sent.lock().push(message.to_string());
        Ok(())
    }
}

pub struct AlwaysFinal;

#[async_trait]
impl FinalityOracle for AlwaysFinal {
    async fn is_final(&self, _block_hash: &str) -> bool {
        true
    }
}

pub fn context_with(indexer: Arc<dyn IndexerClient>, notifier: Arc<dyn Notifier>) -> HandlerContext {
    HandlerContext {
        indexer,
        store: Arc::new(InMemoryStateStore::new()),
        notifier,
        finality: Arc::new(AlwaysFinal),
        channel_id: "-100200300".to_string(),
        message_options: MessageOptions::default(),
    }
}

pub fn dispatcher_for(processor: Arc<RecordingProcessor>) -> EventDispatcher {
    let context = context_with(Arc::new(NoIndexer), Arc::new(RecordingNotifier::default()));
    let handler = SerializedBlockHandler::new(context, BlockStrategy::StateMutating(processor));
    EventDispatcher::new(ConcurrencyGate::new(), Arc::new(handler))
}

pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Poll `check` until it holds or `limit` elapses.
pub async fn eventually(limit: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    check()
}

#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
