//! Builtin components shipped with the `jc` binary

mod heartbeat;
mod recorder;

use std::sync::Arc;
use std::time::Duration;

use memorystore::MemoryStore;
use tracing::debug;

use crate::component::Component;
use crate::config::ComponentsConfig;

pub use heartbeat::{HEARTBEAT, Heartbeat};
pub use recorder::Recorder;

/// Components enabled by configuration, ready to register
pub fn builtin(config: &ComponentsConfig, memory: Arc<MemoryStore>) -> Vec<Box<dyn Component>> {
    debug!(?config, "builtin: called");
    let mut components: Vec<Box<dyn Component>> = Vec::new();

    if config.recorder {
        components.push(Box::new(Recorder::new(memory)));
    }
    if config.heartbeat_interval_secs > 0 {
        components.push(Box::new(Heartbeat::new(Duration::from_secs(config.heartbeat_interval_secs))));
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{Message, MessageBus};
    use crate::component::ComponentContext;
    use serde_json::json;

    fn memory() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::open_in_memory().unwrap())
    }

    #[test]
    fn test_builtin_follows_config() {
        let names = |config: &ComponentsConfig| -> Vec<String> {
            builtin(config, memory()).iter().map(|c| c.name().to_string()).collect()
        };

        assert_eq!(names(&ComponentsConfig::default()), vec!["recorder"]);
        assert_eq!(
            names(&ComponentsConfig {
                recorder: true,
                heartbeat_interval_secs: 5,
            }),
            vec!["recorder", "heartbeat"]
        );
        assert!(
            names(&ComponentsConfig {
                recorder: false,
                heartbeat_interval_secs: 0,
            })
            .is_empty()
        );
    }

    #[tokio::test]
    async fn test_recorder_stores_message_with_context() {
        let memory = memory();
        let ctx = ComponentContext::new(Recorder::NAME, MessageBus::new());
        let mut recorder = Recorder::new(memory.clone());
        assert!(recorder.initialize(&ctx).await.unwrap());

        let msg = Message::new("A", "PING", json!({"n": 1}));
        let id = msg.id().to_string();
        recorder.process_message(msg, &ctx).await.unwrap();

        let stored = memory.get_recent_interactions(1).unwrap();
        assert_eq!(stored[0].interaction_type, "PING");
        assert_eq!(stored[0].data, json!({"n": 1}));
        let context = stored[0].context.as_ref().unwrap();
        assert_eq!(context["source"], "A");
        assert_eq!(context["id"], id);
    }

    #[tokio::test]
    async fn test_recorder_skips_shutdown() {
        let memory = memory();
        let ctx = ComponentContext::new(Recorder::NAME, MessageBus::new());
        let mut recorder = Recorder::new(memory.clone());

        recorder
            .process_message(Message::shutdown("Controller", "other"), &ctx)
            .await
            .unwrap();

        assert_eq!(memory.interaction_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_heartbeat_emits_sequenced_beats() {
        let bus = MessageBus::new();
        let ctx = ComponentContext::new(Heartbeat::NAME, bus.clone());
        let mut heartbeat = Heartbeat::new(Duration::from_millis(20));
        assert!(heartbeat.initialize(&ctx).await.unwrap());

        let first = bus.dequeue().await.unwrap();
        let second = bus.dequeue().await.unwrap();
        assert_eq!(first.message_type(), HEARTBEAT);
        assert_eq!(first.source(), Heartbeat::NAME);
        assert_eq!(first.data(), &json!({"seq": 1}));
        assert_eq!(second.data(), &json!({"seq": 2}));
    }

    #[tokio::test]
    async fn test_heartbeat_stops_when_dropped() {
        let bus = MessageBus::new();
        let ctx = ComponentContext::new(Heartbeat::NAME, bus.clone());
        let mut heartbeat = Heartbeat::new(Duration::from_millis(10));
        heartbeat.initialize(&ctx).await.unwrap();
        drop(heartbeat);

        let before = bus.metrics().enqueued;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(bus.metrics().enqueued, before);
    }

    #[tokio::test]
    async fn test_heartbeat_rejects_zero_interval() {
        let ctx = ComponentContext::new(Heartbeat::NAME, MessageBus::new());
        let mut heartbeat = Heartbeat::new(Duration::ZERO);
        assert!(heartbeat.initialize(&ctx).await.is_err());
    }
}
