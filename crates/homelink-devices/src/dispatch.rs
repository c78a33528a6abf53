//! Command dispatch to the controller.
//!
//! Fire-and-forget: a dispatch succeeds once the publish has been handed to
//! the MQTT client. No broker acknowledgment is awaited, nothing is retried,
//! and device/action strings are forwarded unchanged — an unknown target is
//! the controller's to ignore.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rumqttc::{AsyncClient, QoS};
use tracing::{info, warn};

use homelink_core::DeviceCommand;

use crate::error::DeviceError;

/// Where commands get published. The production sink is the shared
/// [`AsyncClient`]; tests substitute a capture.
#[async_trait]
pub trait CommandSink: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), DeviceError>;
}

#[async_trait]
impl CommandSink for AsyncClient {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), DeviceError> {
        AsyncClient::publish(self, topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(|e| DeviceError::Publish(e.to_string()))
    }
}

/// Builds and publishes [`DeviceCommand`]s on the command topic.
pub struct CommandDispatcher {
    sink: Arc<dyn CommandSink>,
    topic: String,
}

impl CommandDispatcher {
    pub fn new(sink: Arc<dyn CommandSink>, topic: impl Into<String>) -> Self {
        Self {
            sink,
            topic: topic.into(),
        }
    }

    /// Publish one command. `Ok` means the publish was issued, nothing more.
    pub async fn dispatch(&self, device: &str, action: &str) -> Result<DeviceCommand, DeviceError> {
        let command = DeviceCommand::new(device, action, Utc::now());
        let payload = serde_json::to_vec(&command)?;

        match self.sink.publish(&self.topic, payload).await {
            Ok(()) => {
                info!(device, action, topic = %self.topic, "command dispatched");
                Ok(command)
            }
            Err(e) => {
                warn!(device, action, error = %e, "command publish failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Captures published payloads instead of talking to a broker.
    #[derive(Default)]
    struct CaptureSink {
        published: Mutex<Vec<(String, Vec<u8>)>>,
    }

    #[async_trait]
    impl CommandSink for CaptureSink {
        async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), DeviceError> {
            self.published
                .lock()
                .unwrap()
                .push((topic.to_string(), payload));
            Ok(())
        }
    }

    struct DeadSink;

    #[async_trait]
    impl CommandSink for DeadSink {
        async fn publish(&self, _topic: &str, _payload: Vec<u8>) -> Result<(), DeviceError> {
            Err(DeviceError::Publish("broker unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn publishes_exactly_one_command_with_given_fields() {
        let sink = Arc::new(CaptureSink::default());
        let dispatcher = CommandDispatcher::new(sink.clone(), "home/command");

        let command = dispatcher.dispatch("relay3", "on").await.unwrap();
        assert_eq!(command.device, "relay3");
        assert_eq!(command.action, "on");

        let published = sink.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        let (topic, payload) = &published[0];
        assert_eq!(topic, "home/command");

        let json: serde_json::Value = serde_json::from_slice(payload).unwrap();
        assert_eq!(json["device"], "relay3");
        assert_eq!(json["action"], "on");
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn unknown_devices_are_forwarded_unchanged() {
        let sink = Arc::new(CaptureSink::default());
        let dispatcher = CommandDispatcher::new(sink.clone(), "home/command");
        dispatcher.dispatch("relay99", "toggle").await.unwrap();

        let published = sink.published.lock().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&published[0].1).unwrap();
        assert_eq!(json["device"], "relay99");
    }

    #[tokio::test]
    async fn publish_failure_is_an_err_not_a_panic() {
        let dispatcher = CommandDispatcher::new(Arc::new(DeadSink), "home/command");
        let result = dispatcher.dispatch("relay1", "off").await;
        assert!(matches!(result, Err(DeviceError::Publish(_))));
    }
}
