//! In-memory server state.
//!
//! Process-local only; state is lost on restart.

use crate::domain::ChainTip;
use crate::error::IngestionResult;
use crate::ports::ServerStateStore;
use async_trait::async_trait;
use parking_lot::RwLock;

#[derive(Default)]
pub struct InMemoryStateStore {
    tip: RwLock<Option<ChainTip>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a known tip, e.g. one recovered by an operator.
    pub fn with_tip(tip: ChainTip) -> Self {
        Self {
            tip: RwLock::new(Some(tip)),
        }
    }
}

#[async_trait]
impl ServerStateStore for InMemoryStateStore {
    async fn processed_tip(&self) -> IngestionResult<Option<ChainTip>> {
        Ok(self.tip.read().clone())
    }

    async fn save_processed_tip(&self, tip: ChainTip) -> IngestionResult<()> {
        *self.tip.write() = Some(tip);
        Ok(())
    }
}
