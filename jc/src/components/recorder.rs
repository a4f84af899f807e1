//! Recorder - persists bus traffic to the memory store

use std::sync::Arc;

use async_trait::async_trait;
use eyre::{Context, Result};
use memorystore::MemoryStore;
use serde_json::json;
use tracing::{debug, info};

use crate::bus::Message;
use crate::component::{Component, ComponentContext};

/// Stores every non-shutdown message it dequeues as an interaction
pub struct Recorder {
    memory: Arc<MemoryStore>,
    recorded: u64,
}

impl Recorder {
    pub const NAME: &'static str = "recorder";

    pub fn new(memory: Arc<MemoryStore>) -> Self {
        Self { memory, recorded: 0 }
    }
}

#[async_trait]
impl Component for Recorder {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn initialize(&mut self, _ctx: &ComponentContext) -> Result<bool> {
        info!(store = %self.memory.location(), "Recorder attached to memory store");
        Ok(true)
    }

    async fn process_message(&mut self, message: Message, _ctx: &ComponentContext) -> Result<()> {
        // Foreign shutdowns delivered under the deliver policy are not traffic.
        if message.is_shutdown() {
            debug!(target = ?message.target(), "Recorder: skipping shutdown envelope");
            return Ok(());
        }

        let memory = self.memory.clone();
        let context = json!({
            "source": message.source(),
            "timestamp": message.timestamp(),
            "id": message.id(),
        });
        let message_type = message.message_type().to_string();
        let data = message.data().clone();

        tokio::task::spawn_blocking(move || memory.store_interaction(&message_type, &data, Some(&context)))
            .await
            .context("Recorder storage task failed")??;

        self.recorded += 1;
        debug!(recorded = self.recorded, "Recorder: stored message");
        Ok(())
    }
}
