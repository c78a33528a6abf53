//! Request and response envelopes.
//!
//! The envelope shape (`success` + payload + `timestamp`) matches what the
//! reference clients already speak.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use homelink_core::{DeviceState, Intent};

use crate::history::{ChatRecord, SensorRecord};

/// Maximum JSON request body size (2 MB).
pub const MAX_REQUEST_BODY_SIZE: usize = 2 * 1024 * 1024;

/// `GET /` banner.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// `GET /api/status` response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub data: DeviceState,
    pub timestamp: DateTime<Utc>,
}

/// `POST /api/control` request. Fields are optional so presence can be
/// checked explicitly and rejected with a 400 rather than a decode error.
#[derive(Debug, Deserialize)]
pub struct ControlRequest {
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

/// `POST /api/control` response.
#[derive(Debug, Serialize)]
pub struct ControlResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// `POST /api/chat` request.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /api/chat` response.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    /// Operator-facing reply text, also available inside `intent`.
    pub reply: String,
    pub intent: Intent,
    /// Whether a command was published as a result of this message.
    pub command_sent: bool,
    pub timestamp: DateTime<Utc>,
}

/// `GET /api/sensors` response.
#[derive(Debug, Serialize)]
pub struct SensorsResponse {
    pub success: bool,
    pub data: Vec<SensorRecord>,
}

/// `GET /api/history` response.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub data: Vec<ChatRecord>,
}

/// Error envelope for 4xx/5xx responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// `?limit=N` query parameter.
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    #[serde(default)]
    pub limit: Option<usize>,
}
