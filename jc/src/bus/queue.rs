//! MessageBus - the single shared queue between components
//!
//! Every component and the controller hold a clone of the same bus. There is
//! no per-component mailbox: whichever consumer dequeues next gets the next
//! envelope, and components filter by `message_type`/target themselves.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{debug, info};

use super::message::Message;

/// Errors from bus operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("Message bus is closed")]
    Closed,
}

/// Snapshot of bus counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusMetrics {
    pub enqueued: u64,
    pub dequeued: u64,
    pub pending: u64,
}

struct BusInner {
    tx: mpsc::UnboundedSender<Message>,
    rx: Mutex<mpsc::UnboundedReceiver<Message>>,
    closed: watch::Sender<bool>,
    enqueued: AtomicU64,
    dequeued: AtomicU64,
}

/// Unbounded FIFO queue shared by all producers and consumers
///
/// Cloning is cheap and every clone refers to the same queue.
#[derive(Clone)]
pub struct MessageBus {
    inner: Arc<BusInner>,
}

impl MessageBus {
    /// Create an empty, open bus
    pub fn new() -> Self {
        debug!("MessageBus::new: creating bus");
        let (tx, rx) = mpsc::unbounded_channel();
        let (closed, _) = watch::channel(false);
        Self {
            inner: Arc::new(BusInner {
                tx,
                rx: Mutex::new(rx),
                closed,
                enqueued: AtomicU64::new(0),
                dequeued: AtomicU64::new(0),
            }),
        }
    }

    /// Append a message at the tail
    ///
    /// Never blocks. Fails only once the bus has been closed.
    pub fn enqueue(&self, message: Message) -> Result<(), BusError> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }

        debug!(
            id = %message.id(),
            source = %message.source(),
            message_type = %message.message_type(),
            "MessageBus::enqueue"
        );

        self.inner.enqueued.fetch_add(1, Ordering::Relaxed);
        if self.inner.tx.send(message).is_err() {
            self.inner.enqueued.fetch_sub(1, Ordering::Relaxed);
            return Err(BusError::Closed);
        }
        Ok(())
    }

    /// Take the message at the head, waiting until one is available
    ///
    /// Concurrent consumers are served one at a time in arrival order. After
    /// [`close`](Self::close), buffered messages are still handed out and
    /// `BusError::Closed` is returned once the queue is empty.
    pub async fn dequeue(&self) -> Result<Message, BusError> {
        let mut closed_rx = self.inner.closed.subscribe();
        let mut rx = self.inner.rx.lock().await;

        loop {
            match rx.try_recv() {
                Ok(message) => return Ok(self.delivered(message)),
                Err(TryRecvError::Disconnected) => return Err(BusError::Closed),
                Err(TryRecvError::Empty) => {}
            }

            if *closed_rx.borrow_and_update() {
                debug!("MessageBus::dequeue: closed and empty");
                return Err(BusError::Closed);
            }

            tokio::select! {
                message = rx.recv() => {
                    return match message {
                        Some(message) => Ok(self.delivered(message)),
                        None => Err(BusError::Closed),
                    };
                }
                changed = closed_rx.changed() => {
                    if changed.is_err() {
                        return Err(BusError::Closed);
                    }
                    // Loop to drain anything buffered before the close.
                }
            }
        }
    }

    fn delivered(&self, message: Message) -> Message {
        self.inner.dequeued.fetch_add(1, Ordering::Relaxed);
        debug!(
            id = %message.id(),
            message_type = %message.message_type(),
            "MessageBus::dequeue: delivered"
        );
        message
    }

    /// Refuse further enqueues and wake blocked consumers
    pub fn close(&self) {
        if !self.inner.closed.send_replace(true) {
            info!("Message bus closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        *self.inner.closed.borrow()
    }

    /// Current counters
    pub fn metrics(&self) -> BusMetrics {
        let enqueued = self.inner.enqueued.load(Ordering::Relaxed);
        let dequeued = self.inner.dequeued.load(Ordering::Relaxed);
        BusMetrics {
            enqueued,
            dequeued,
            pending: enqueued.saturating_sub(dequeued),
        }
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_single_producer_fifo() {
        let bus = MessageBus::new();
        for i in 0..50 {
            bus.enqueue(Message::new("A", "seq", json!({"i": i}))).unwrap();
        }

        for i in 0..50 {
            let msg = bus.dequeue().await.unwrap();
            assert_eq!(msg.data()["i"], i);
        }
    }

    #[tokio::test]
    async fn test_per_producer_order_with_many_producers() {
        let bus = MessageBus::new();

        let mut producers = Vec::new();
        for p in 0..4 {
            let bus = bus.clone();
            producers.push(tokio::spawn(async move {
                for i in 0..25 {
                    bus.enqueue(Message::new(format!("p{}", p), "seq", json!({"i": i}))).unwrap();
                    tokio::task::yield_now().await;
                }
            }));
        }
        for producer in producers {
            producer.await.unwrap();
        }

        let mut last_seen = std::collections::HashMap::new();
        for _ in 0..100 {
            let msg = bus.dequeue().await.unwrap();
            let i = msg.data()["i"].as_i64().unwrap();
            let prev = last_seen.insert(msg.source().to_string(), i);
            if let Some(prev) = prev {
                assert!(i > prev, "{} went from {} to {}", msg.source(), prev, i);
            }
        }
        assert_eq!(bus.metrics().pending, 0);
    }

    #[tokio::test]
    async fn test_dequeue_waits_for_enqueue() {
        let bus = MessageBus::new();
        let consumer = {
            let bus = bus.clone();
            tokio::spawn(async move { bus.dequeue().await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!consumer.is_finished());

        bus.enqueue(Message::new("A", "late", json!({}))).unwrap();
        let msg = consumer.await.unwrap().unwrap();
        assert_eq!(msg.message_type(), "late");
    }

    #[tokio::test]
    async fn test_close_wakes_blocked_consumer() {
        let bus = MessageBus::new();
        let consumer = {
            let bus = bus.clone();
            tokio::spawn(async move { bus.dequeue().await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        bus.close();

        let result = tokio::time::timeout(Duration::from_secs(1), consumer).await.unwrap().unwrap();
        assert_eq!(result.unwrap_err(), BusError::Closed);
    }

    #[tokio::test]
    async fn test_close_drains_buffered_then_errors() {
        let bus = MessageBus::new();
        bus.enqueue(Message::new("A", "first", json!({}))).unwrap();
        bus.enqueue(Message::new("A", "second", json!({}))).unwrap();
        bus.close();

        assert!(bus.is_closed());
        assert_eq!(
            bus.enqueue(Message::new("A", "third", json!({}))).unwrap_err(),
            BusError::Closed
        );
        assert_eq!(bus.dequeue().await.unwrap().message_type(), "first");
        assert_eq!(bus.dequeue().await.unwrap().message_type(), "second");
        assert_eq!(bus.dequeue().await.unwrap_err(), BusError::Closed);
    }

    #[tokio::test]
    async fn test_metrics_track_flow() {
        let bus = MessageBus::new();
        bus.enqueue(Message::new("A", "x", json!({}))).unwrap();
        bus.enqueue(Message::new("A", "y", json!({}))).unwrap();
        bus.dequeue().await.unwrap();

        assert_eq!(
            bus.metrics(),
            BusMetrics {
                enqueued: 2,
                dequeued: 1,
                pending: 1
            }
        );
    }
}
