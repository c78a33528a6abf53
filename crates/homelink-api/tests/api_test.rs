//! End-to-end facade tests against fake transport and classifier.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use tower::ServiceExt;

use homelink_api::{create_router, History, ServerState};
use homelink_core::TelemetryReading;
use homelink_devices::{CommandDispatcher, CommandSink, DeviceError, DeviceStateStore};
use homelink_llm::{IntentTranslator, LlmBackend, LlmError};

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

struct ScriptedBackend {
    reply: Option<String>,
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(LlmError::Network("timed out".to_string())),
        }
    }
}

struct Harness {
    app: Router,
    sink: Arc<CaptureSink>,
    store: DeviceStateStore,
    history: History,
}

fn harness(classifier_reply: Option<&str>) -> Harness {
    let store = DeviceStateStore::new(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
    let sink = Arc::new(CaptureSink::default());
    let dispatcher = Arc::new(CommandDispatcher::new(sink.clone(), "home/command"));
    let translator = Arc::new(IntentTranslator::new(Arc::new(ScriptedBackend {
        reply: classifier_reply.map(str::to_string),
    })));
    let history = History::new();
    let state = ServerState::new(store.clone(), dispatcher, translator, history.clone());

    Harness {
        app: create_router(state, &[]),
        sink,
        store,
        history,
    }
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn root_banner() {
    let h = harness(None);
    let (status, json) = get_json(&h.app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "online");
    assert_eq!(json["service"], "HomeLink Bridge");
}

#[tokio::test]
async fn status_returns_snapshot() {
    let h = harness(None);
    h.store.mark_heartbeat(Utc::now()).await;

    let (status, json) = get_json(&h.app, "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["online"], true);
    assert_eq!(json["data"]["relay1"], false);
}

#[tokio::test]
async fn control_requires_device_and_action() {
    let h = harness(None);
    let (status, json) = post_json(&h.app, "/api/control", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);

    let (status, _) = post_json(
        &h.app,
        "/api/control",
        serde_json::json!({"device": "relay1"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        &h.app,
        "/api/control",
        serde_json::json!({"device": "  ", "action": "on"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn control_dispatches_one_command() {
    let h = harness(None);
    let (status, json) = post_json(
        &h.app,
        "/api/control",
        serde_json::json!({"device": "relay3", "action": "on"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Command sent: on relay3");

    let published = h.sink.published.lock().unwrap();
    assert_eq!(published.len(), 1);
    let payload: serde_json::Value = serde_json::from_slice(&published[0].1).unwrap();
    assert_eq!(payload["device"], "relay3");
    assert_eq!(payload["action"], "on");
}

#[tokio::test]
async fn control_publish_failure_is_a_boolean_not_an_error() {
    let store = DeviceStateStore::new(Utc::now());
    let dispatcher = Arc::new(CommandDispatcher::new(Arc::new(DeadSink), "home/command"));
    let translator = Arc::new(IntentTranslator::new(Arc::new(ScriptedBackend {
        reply: None,
    })));
    let state = ServerState::new(store, dispatcher, translator, History::new());
    let app = create_router(state, &[]);

    let (status, json) = post_json(
        &app,
        "/api/control",
        serde_json::json!({"device": "relay1", "action": "off"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn chat_translates_and_dispatches() {
    let h = harness(Some(
        r#"{"intent":"turn_on","device":"relay1","response":"เปิดไฟแล้วครับ","action_needed":true}"#,
    ));

    let (status, json) = post_json(
        &h.app,
        "/api/chat",
        serde_json::json!({"message": "เปิดไฟ"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["reply"], "เปิดไฟแล้วครับ");
    assert_eq!(json["command_sent"], true);
    assert_eq!(json["intent"]["kind"], "turn_on");

    let published = h.sink.published.lock().unwrap();
    assert_eq!(published.len(), 1);
    let payload: serde_json::Value = serde_json::from_slice(&published[0].1).unwrap();
    assert_eq!(payload["device"], "relay1");
    assert_eq!(payload["action"], "on");
}

#[tokio::test]
async fn chat_falls_back_when_classifier_is_down() {
    let h = harness(None);
    let (status, json) = post_json(
        &h.app,
        "/api/chat",
        serde_json::json!({"message": "เปิดไฟ"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["command_sent"], false);
    assert_eq!(json["intent"]["kind"], "error");
    assert!(h.sink.published.lock().unwrap().is_empty());
}

#[tokio::test]
async fn chat_requires_a_message() {
    let h = harness(None);
    let (status, _) = post_json(&h.app, "/api/chat", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(&h.app, "/api/chat", serde_json::json!({"message": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chat_exchanges_land_in_history() {
    let h = harness(Some(
        r#"{"intent":"status","device":"none","response":"อุณหภูมิตอนนี้ 0 องศาครับ","action_needed":false}"#,
    ));
    post_json(&h.app, "/api/chat", serde_json::json!({"message": "อุณหภูมิเท่าไร"})).await;

    let (status, json) = get_json(&h.app, "/api/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["message"], "อุณหภูมิเท่าไร");
}

#[tokio::test]
async fn sensors_endpoint_serves_recent_readings() {
    let h = harness(None);
    h.history
        .record_reading(
            &TelemetryReading {
                temperature: Some(24.0),
                humidity: Some(55.0),
                gas_level: Some(80),
            },
            Utc::now(),
        )
        .await;
    h.history
        .record_reading(
            &TelemetryReading {
                temperature: Some(25.0),
                humidity: None,
                gas_level: None,
            },
            Utc::now(),
        )
        .await;

    let (status, json) = get_json(&h.app, "/api/sensors?limit=1").await;
    assert_eq!(status, StatusCode::OK);
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["temperature"], 25.0);
    // Omitted fields stay omitted, not defaulted.
    assert!(data[0].get("humidity").is_none());
}
