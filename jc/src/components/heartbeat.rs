//! Heartbeat - periodic liveness messages

use std::time::Duration;

use async_trait::async_trait;
use eyre::Result;
use serde_json::json;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, info};

use crate::bus::Message;
use crate::component::{Component, ComponentContext};

/// Message type emitted on every tick
pub const HEARTBEAT: &str = "HEARTBEAT";

/// Emits `HEARTBEAT {"seq": n}` every `interval`
///
/// The ticker is a separate task started in `initialize`. It ends when the
/// bus closes or the component is dropped.
pub struct Heartbeat {
    interval: Duration,
    ticker: Option<JoinHandle<()>>,
}

impl Heartbeat {
    pub const NAME: &'static str = "heartbeat";

    pub fn new(interval: Duration) -> Self {
        Self { interval, ticker: None }
    }
}

#[async_trait]
impl Component for Heartbeat {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn initialize(&mut self, ctx: &ComponentContext) -> Result<bool> {
        if self.interval.is_zero() {
            eyre::bail!("heartbeat interval must be greater than zero");
        }

        let ctx = ctx.clone();
        let period = self.interval;
        info!(?period, "Heartbeat ticker starting");

        self.ticker = Some(tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            let mut seq: u64 = 0;
            loop {
                ticks.tick().await;
                seq += 1;
                if ctx.emit(HEARTBEAT, json!({ "seq": seq })).is_err() {
                    debug!(seq, "Heartbeat: bus closed, ticker exiting");
                    break;
                }
            }
        }));
        Ok(true)
    }

    async fn process_message(&mut self, message: Message, _ctx: &ComponentContext) -> Result<()> {
        debug!(message_type = %message.message_type(), "Heartbeat: ignoring message");
        Ok(())
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}
