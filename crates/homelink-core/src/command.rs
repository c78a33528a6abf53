//! Wire command sent to the controller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One command on the command topic: act on one actuator, once.
///
/// Published fire-and-forget; never retried, never persisted. The device
/// and action are carried as raw strings so manual control can forward
/// whatever the operator supplied — an unknown target is the receiving
/// controller's problem to ignore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCommand {
    pub device: String,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

impl DeviceCommand {
    /// Build a command stamped `at`.
    pub fn new(device: impl Into<String>, action: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            device: device.into(),
            action: action.into(),
            timestamp: at,
        }
    }
}
