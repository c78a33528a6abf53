//! Bounded in-memory histories.
//!
//! The reference deployment logged telemetry and chat exchanges to a
//! database; persistence is out of scope here, so the facade keeps short
//! rings instead. Oldest entries fall off the back.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use homelink_core::TelemetryReading;

/// How many telemetry readings are retained.
const SENSOR_CAPACITY: usize = 500;

/// How many chat exchanges are retained.
const CHAT_CAPACITY: usize = 200;

/// One retained telemetry reading. Fields the device omitted stay empty,
/// mirroring the accepted payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_level: Option<i64>,
    pub timestamp: DateTime<Utc>,
}

/// One retained chat exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRecord {
    pub message: String,
    pub reply: String,
    pub timestamp: DateTime<Utc>,
}

/// Shared history rings.
#[derive(Debug, Clone, Default)]
pub struct History {
    readings: Arc<RwLock<VecDeque<SensorRecord>>>,
    chats: Arc<RwLock<VecDeque<ChatRecord>>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted telemetry reading.
    pub async fn record_reading(&self, reading: &TelemetryReading, at: DateTime<Utc>) {
        let mut readings = self.readings.write().await;
        if readings.len() == SENSOR_CAPACITY {
            readings.pop_front();
        }
        readings.push_back(SensorRecord {
            temperature: reading.temperature,
            humidity: reading.humidity,
            gas_level: reading.gas_level,
            timestamp: at,
        });
    }

    /// Record one chat exchange.
    pub async fn record_chat(
        &self,
        message: impl Into<String>,
        reply: impl Into<String>,
        at: DateTime<Utc>,
    ) {
        let mut chats = self.chats.write().await;
        if chats.len() == CHAT_CAPACITY {
            chats.pop_front();
        }
        chats.push_back(ChatRecord {
            message: message.into(),
            reply: reply.into(),
            timestamp: at,
        });
    }

    /// The most recent readings, newest first.
    pub async fn recent_readings(&self, limit: usize) -> Vec<SensorRecord> {
        let readings = self.readings.read().await;
        readings.iter().rev().take(limit).cloned().collect()
    }

    /// The most recent chat exchanges, oldest first (conversation order).
    pub async fn recent_chats(&self, limit: usize) -> Vec<ChatRecord> {
        let chats = self.chats.read().await;
        let mut recent: Vec<ChatRecord> = chats.iter().rev().take(limit).cloned().collect();
        recent.reverse();
        recent
    }
}
