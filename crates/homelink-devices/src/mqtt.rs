//! MQTT transport for the bridge.
//!
//! Owns the broker connection: subscribes to the device's three inbound
//! topics and feeds every publish through [`crate::ingest::handle_message`].
//! The same client is reused by the dispatcher for the command topic.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use homelink_core::config::MqttSettings;
use homelink_core::TopicSet;

use crate::error::DeviceError;
use crate::ingest::{self, IngestEvent};
use crate::store::DeviceStateStore;

/// Capacity of the rumqttc request channel.
const REQUEST_CAPACITY: usize = 64;

/// Capacity of the accepted-message event channel.
const EVENT_CAPACITY: usize = 256;

/// Pause before polling again after an event-loop error. rumqttc
/// reconnects on the next poll; this just keeps a dead broker from
/// spinning the task hot.
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// A live broker connection plus the listener task driving it.
pub struct MqttBridge {
    client: AsyncClient,
    listener: JoinHandle<()>,
    event_tx: broadcast::Sender<IngestEvent>,
}

impl MqttBridge {
    /// Connect to the broker, subscribe to the inbound topics, and start
    /// the listener task.
    pub async fn connect(
        settings: &MqttSettings,
        topics: TopicSet,
        store: DeviceStateStore,
    ) -> Result<Self, DeviceError> {
        let client_id = format!("homelink-{}", std::process::id());
        let mut options = MqttOptions::new(client_id, &settings.broker, settings.port);
        options.set_keep_alive(Duration::from_secs(30));

        let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);

        for topic in [&topics.sensor, &topics.status, &topics.heartbeat] {
            client
                .subscribe(topic, QoS::AtLeastOnce)
                .await
                .map_err(|e| DeviceError::Connection(format!("subscribe {topic}: {e}")))?;
        }
        info!(broker = %settings.broker, port = settings.port, "mqtt bridge connecting");

        let listener_tx = event_tx.clone();
        let listener = tokio::spawn(async move {
            let mut reconnects: u64 = 0;
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        if let Some(event) =
                            ingest::handle_message(&store, &topics, &publish.topic, &publish.payload)
                                .await
                        {
                            // Nobody listening is fine.
                            let _ = listener_tx.send(event);
                        }
                    }
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        debug!("mqtt connected");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        reconnects += 1;
                        warn!(error = %e, reconnects, "mqtt event loop error, retrying");
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                }
            }
        });

        Ok(Self {
            client,
            listener,
            event_tx,
        })
    }

    /// Handle to the underlying client, for publishing commands.
    pub fn client(&self) -> AsyncClient {
        self.client.clone()
    }

    /// Subscribe to the stream of accepted inbound messages.
    pub fn subscribe_events(&self) -> broadcast::Receiver<IngestEvent> {
        self.event_tx.subscribe()
    }

    /// Stop the listener task.
    pub fn shutdown(&self) {
        self.listener.abort();
    }
}

impl Drop for MqttBridge {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
