//! Free text → structured intent.
//!
//! The prompt embeds the full device snapshot and a set of worked examples
//! pairing literal operator phrases with literal intent JSON; those
//! examples are the only domain coverage, there is no local rule engine.
//! Translation is total: any backend failure or unparseable response
//! becomes the fixed fallback intent, never an error.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use homelink_core::{DeviceState, Intent, IntentKind, RelayId};

use crate::backend::LlmBackend;

/// Apologetic reply used whenever translation fails.
pub const FALLBACK_REPLY: &str = "ขออภัย ไม่สามารถประมวลผลคำสั่งได้ในขณะนี้";

/// Turns operator text into [`Intent`]s via a completion backend.
pub struct IntentTranslator {
    backend: Arc<dyn LlmBackend>,
}

impl IntentTranslator {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    /// Translate one operator message against a state snapshot.
    ///
    /// The snapshot is taken by the caller before this call starts; no
    /// lock is held while the backend request is in flight. This function
    /// never fails: the worst case is the fallback intent.
    pub async fn translate(&self, text: &str, snapshot: &DeviceState) -> Intent {
        let prompt = build_prompt(text, snapshot);

        let raw = match self.backend.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "classifier call failed");
                return Intent::fallback(FALLBACK_REPLY);
            }
        };

        match parse_intent(&raw) {
            Some(intent) => {
                debug!(kind = intent.kind.as_str(), "classifier intent parsed");
                intent
            }
            None => {
                warn!(response = raw.as_str(), "classifier response did not match the intent schema");
                Intent::fallback(FALLBACK_REPLY)
            }
        }
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}

/// Build the classifier prompt for `text` against `state`.
pub fn build_prompt(text: &str, state: &DeviceState) -> String {
    format!(
        r#"You are a smart home assistant. Analyze this Thai command and return a JSON response.

Current device status:
- Temperature: {temperature}°C
- Humidity: {humidity}%
- Gas Level: {gas_level}
- Relay 1 (Light/ไฟ): {relay1}
- Relay 2 (Fan/พัดลม): {relay2}
- Relay 3 (Air Conditioner/แอร์): {relay3}
- Relay 4 (Water Pump/ปั๊มน้ำ): {relay4}
- Relay 5 (Heater/ฮีทเตอร์): {relay5}
- Relay 6 (Extra Device/อุปกรณ์เพิ่มเติม): {relay6}

User command: "{text}"

Return JSON with:
{{
  "intent": "turn_on|turn_off|toggle|status|question",
  "device": "relay1|relay2|relay3|relay4|relay5|relay6|light|fan|ac|air_conditioner|water_pump|pump|heater|extra|none",
  "response": "Thai response message",
  "action_needed": true/false
}}

Examples:
- "เปิดไฟ" → {{"intent":"turn_on","device":"relay1","response":"เปิดไฟแล้วครับ","action_needed":true}}
- "ปิดไฟ" → {{"intent":"turn_off","device":"relay1","response":"ปิดไฟแล้วครับ","action_needed":true}}
- "เปิดพัดลม" → {{"intent":"turn_on","device":"relay2","response":"เปิดพัดลมแล้วครับ","action_needed":true}}
- "ปิดพัดลม" → {{"intent":"turn_off","device":"relay2","response":"ปิดพัดลมแล้วครับ","action_needed":true}}
- "เปิดแอร์" → {{"intent":"turn_on","device":"relay3","response":"เปิดแอร์แล้วครับ","action_needed":true}}
- "ปิดแอร์" → {{"intent":"turn_off","device":"relay3","response":"ปิดแอร์แล้วครับ","action_needed":true}}
- "เปิดปั๊มน้ำ" → {{"intent":"turn_on","device":"relay4","response":"เปิดปั๊มน้ำแล้วครับ","action_needed":true}}
- "ปิดปั๊มน้ำ" → {{"intent":"turn_off","device":"relay4","response":"ปิดปั๊มน้ำแล้วครับ","action_needed":true}}
- "เปิดฮีทเตอร์" → {{"intent":"turn_on","device":"relay5","response":"เปิดฮีทเตอร์แล้วครับ","action_needed":true}}
- "ปิดฮีทเตอร์" → {{"intent":"turn_off","device":"relay5","response":"ปิดฮีทเตอร์แล้วครับ","action_needed":true}}
- "เปิดอุปกรณ์เพิ่มเติม" → {{"intent":"turn_on","device":"relay6","response":"เปิดอุปกรณ์เพิ่มเติมแล้วครับ","action_needed":true}}
- "ปิดอุปกรณ์เพิ่มเติม" → {{"intent":"turn_off","device":"relay6","response":"ปิดอุปกรณ์เพิ่มเติมแล้วครับ","action_needed":true}}
- "อุณหภูมิเท่าไร" → {{"intent":"status","device":"none","response":"อุณหภูมิตอนนี้ {temperature} องศาครับ","action_needed":false}}
- "ความชื้นเท่าไร" → {{"intent":"status","device":"none","response":"ความชื้นตอนนี้ {humidity}% ครับ","action_needed":false}}
"#,
        temperature = state.temperature,
        humidity = state.humidity,
        gas_level = state.gas_level,
        relay1 = on_off(state.relay1),
        relay2 = on_off(state.relay2),
        relay3 = on_off(state.relay3),
        relay4 = on_off(state.relay4),
        relay5 = on_off(state.relay5),
        relay6 = on_off(state.relay6),
        text = text,
    )
}

/// Response shape the classifier is asked to produce.
#[derive(Debug, Deserialize)]
struct RawIntent {
    intent: String,
    #[serde(default)]
    device: String,
    #[serde(default)]
    response: String,
    #[serde(default)]
    action_needed: bool,
}

/// Cut the JSON object out of a response that may be wrapped in markdown
/// fences or prose.
fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn parse_intent(raw: &str) -> Option<Intent> {
    let json = extract_json(raw)?;
    let parsed: RawIntent = serde_json::from_str(json).ok()?;
    let kind = IntentKind::parse(&parsed.intent)?;

    Some(
        Intent {
            kind,
            device: RelayId::parse(&parsed.device),
            reply: parsed.response,
            action_needed: parsed.action_needed,
        }
        .normalized(),
    )
}
