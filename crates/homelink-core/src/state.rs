//! Canonical device state and per-topic wire schemas.
//!
//! One `DeviceState` record exists per process. It is owned by the state
//! store in `homelink-devices`; everything here is plain data plus the merge
//! rules applied when a message is accepted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::relay::RelayId;

/// The single canonical view of the controller.
///
/// `online` is a cached liveness flag: it is recomputed on message arrival
/// and by the liveness monitor, never on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    pub temperature: f64,
    pub humidity: f64,
    pub gas_level: i64,
    pub relay1: bool,
    pub relay2: bool,
    pub relay3: bool,
    pub relay4: bool,
    pub relay5: bool,
    pub relay6: bool,
    pub last_seen: DateTime<Utc>,
    pub online: bool,
}

impl DeviceState {
    /// Initial state at process start.
    ///
    /// `last_seen` starts at `started_at` so liveness is computed relative
    /// to startup rather than an unset timestamp; the device is offline
    /// until first contact.
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            temperature: 0.0,
            humidity: 0.0,
            gas_level: 0,
            relay1: false,
            relay2: false,
            relay3: false,
            relay4: false,
            relay5: false,
            relay6: false,
            last_seen: started_at,
            online: false,
        }
    }

    /// Read one relay.
    pub fn relay(&self, id: RelayId) -> bool {
        match id {
            RelayId::Relay1 => self.relay1,
            RelayId::Relay2 => self.relay2,
            RelayId::Relay3 => self.relay3,
            RelayId::Relay4 => self.relay4,
            RelayId::Relay5 => self.relay5,
            RelayId::Relay6 => self.relay6,
        }
    }

    /// Merge a telemetry reading: only the fields present in the payload
    /// overwrite, and any accepted reading refreshes liveness.
    pub fn merge_telemetry(&mut self, reading: &TelemetryReading, now: DateTime<Utc>) {
        if let Some(temperature) = reading.temperature {
            self.temperature = temperature;
        }
        if let Some(humidity) = reading.humidity {
            self.humidity = humidity;
        }
        if let Some(gas_level) = reading.gas_level {
            self.gas_level = gas_level;
        }
        self.mark_seen(now);
    }

    /// Overwrite all six relays verbatim from a status report.
    pub fn apply_status(&mut self, status: &RelayStatus, now: DateTime<Utc>) {
        self.relay1 = status.relay1;
        self.relay2 = status.relay2;
        self.relay3 = status.relay3;
        self.relay4 = status.relay4;
        self.relay5 = status.relay5;
        self.relay6 = status.relay6;
        self.mark_seen(now);
    }

    /// Any accepted message proves the device is alive.
    pub fn mark_seen(&mut self, now: DateTime<Utc>) {
        self.last_seen = now;
        self.online = true;
    }

    /// Demote to offline. Only the liveness monitor calls this.
    pub fn mark_offline(&mut self) {
        self.online = false;
    }

    /// How long the device has been silent as of `now`.
    pub fn silent_for(&self, now: DateTime<Utc>) -> Duration {
        now - self.last_seen
    }
}

/// Payload of the sensor topic.
///
/// Every field is optional: the firmware occasionally reports a subset, and
/// a partial reading overwrites only what it carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_level: Option<i64>,
}

/// Payload of the status topic: all six relays, reported verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayStatus {
    pub relay1: bool,
    pub relay2: bool,
    pub relay3: bool,
    pub relay4: bool,
    pub relay5: bool,
    pub relay6: bool,
}
