//! Inbound message reconciliation.
//!
//! [`handle_message`] is the whole routing policy: it validates and parses
//! one raw payload and applies it to the store. It never returns an error —
//! a bad payload is logged and dropped, and the listener keeps going. The
//! transport wrapper lives in [`crate::mqtt`].

use chrono::Utc;
use tracing::{debug, warn};

use homelink_core::{RelayStatus, TelemetryReading, TopicSet};

use crate::store::DeviceStateStore;

/// Heartbeat payloads must be exactly this token.
const HEARTBEAT_TOKEN: &str = "alive";

/// Connection-status sentinels some brokers and firmwares emit on data
/// topics; they carry no state and are skipped.
const SENTINELS: [&str; 2] = ["Connected", "Disconnected"];

/// What an accepted message was. Rejected or irrelevant messages produce
/// no event.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestEvent {
    Heartbeat,
    Telemetry(TelemetryReading),
    Status(RelayStatus),
}

/// Route one raw message to the store.
///
/// Returns the event that was applied, or `None` if the message was
/// skipped. Skipping is never an error; the listener keeps going.
pub async fn handle_message(
    store: &DeviceStateStore,
    topics: &TopicSet,
    topic: &str,
    payload: &[u8],
) -> Option<IngestEvent> {
    let Ok(text) = std::str::from_utf8(payload) else {
        debug!(topic, "skipping non-utf8 payload");
        return None;
    };

    if topic == topics.heartbeat {
        // Anything other than the literal token is ignored, not an error.
        if text == HEARTBEAT_TOKEN {
            debug!("heartbeat received");
            store.mark_heartbeat(Utc::now()).await;
            return Some(IngestEvent::Heartbeat);
        }
        debug!(payload = text, "ignoring unexpected heartbeat payload");
        return None;
    }

    if text.trim().is_empty() || SENTINELS.contains(&text) {
        debug!(topic, payload = text, "skipping non-JSON message");
        return None;
    }

    if topic == topics.sensor {
        match serde_json::from_str::<TelemetryReading>(text) {
            Ok(reading) => {
                store.apply_telemetry(&reading, Utc::now()).await;
                Some(IngestEvent::Telemetry(reading))
            }
            Err(e) => {
                warn!(topic, payload = text, error = %e, "invalid telemetry payload, skipping");
                None
            }
        }
    } else if topic == topics.status {
        match serde_json::from_str::<RelayStatus>(text) {
            Ok(status) => {
                store.apply_status(&status, Utc::now()).await;
                Some(IngestEvent::Status(status))
            }
            Err(e) => {
                warn!(topic, payload = text, error = %e, "invalid status payload, skipping");
                None
            }
        }
    } else {
        debug!(topic, "ignoring message on unknown topic");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn store() -> DeviceStateStore {
        DeviceStateStore::new(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn heartbeat_token_marks_online() {
        let store = store();
        let event =
            handle_message(&store, &TopicSet::default(), "home/heartbeat", b"alive").await;
        assert_eq!(event, Some(IngestEvent::Heartbeat));
        assert!(store.snapshot().await.online);
    }

    #[tokio::test]
    async fn non_token_heartbeat_is_ignored() {
        let store = store();
        handle_message(&store, &TopicSet::default(), "home/heartbeat", b"ALIVE").await;
        handle_message(&store, &TopicSet::default(), "home/heartbeat", b"ping").await;
        assert!(!store.snapshot().await.online);
    }

    #[tokio::test]
    async fn telemetry_updates_readings() {
        let store = store();
        let event = handle_message(
            &store,
            &TopicSet::default(),
            "home/sensor",
            br#"{"temperature":31.5,"humidity":55.0,"gas_level":210}"#,
        )
        .await;
        assert!(matches!(event, Some(IngestEvent::Telemetry(_))));

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.temperature, 31.5);
        assert_eq!(snapshot.humidity, 55.0);
        assert_eq!(snapshot.gas_level, 210);
        assert!(snapshot.online);
    }

    #[tokio::test]
    async fn malformed_payloads_leave_state_unchanged() {
        let store = store();
        let before = store.snapshot().await;
        let topics = TopicSet::default();

        for (topic, payload) in [
            ("home/sensor", b"not json".as_slice()),
            ("home/sensor", b"".as_slice()),
            ("home/sensor", b"   ".as_slice()),
            ("home/sensor", b"Connected".as_slice()),
            ("home/status", b"Disconnected".as_slice()),
            ("home/status", br#"{"relay1":true}"#.as_slice()),
            ("home/sensor", [0xff, 0xfe].as_slice()),
        ] {
            let event = handle_message(&store, &topics, topic, payload).await;
            assert_eq!(event, None, "payload {payload:?} on {topic} was accepted");
        }

        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn status_overwrites_relays_verbatim() {
        let store = store();
        handle_message(
            &store,
            &TopicSet::default(),
            "home/status",
            br#"{"relay1":true,"relay2":false,"relay3":true,"relay4":false,"relay5":true,"relay6":false}"#,
        )
        .await;

        let snapshot = store.snapshot().await;
        assert!(snapshot.relay1);
        assert!(!snapshot.relay2);
        assert!(snapshot.relay3);
        assert!(snapshot.relay5);
        assert!(snapshot.online);
    }

    #[tokio::test]
    async fn unknown_topics_are_ignored() {
        let store = store();
        handle_message(
            &store,
            &TopicSet::default(),
            "home/other",
            br#"{"temperature":99.0}"#,
        )
        .await;
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.temperature, 0.0);
        assert!(!snapshot.online);
    }

    #[tokio::test]
    async fn custom_topic_names_are_honored() {
        let store = store();
        let topics = TopicSet {
            sensor: "site7/telemetry".to_string(),
            status: "site7/relays".to_string(),
            heartbeat: "site7/hb".to_string(),
            command: "site7/cmd".to_string(),
        };
        handle_message(&store, &topics, "site7/hb", b"alive").await;
        assert!(store.snapshot().await.online);
        // The default names mean nothing once overridden.
        handle_message(&store, &topics, "home/sensor", br#"{"temperature":1.0}"#).await;
        assert_eq!(store.snapshot().await.temperature, 0.0);
    }
}
