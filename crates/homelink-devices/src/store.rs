//! The canonical device-state store.
//!
//! One record, one lock. Every mutation happens under the write lock in one
//! step, so readers never observe a half-applied telemetry or status merge,
//! and the ingestor and the liveness monitor serialize against each other.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use homelink_core::{DeviceState, RelayStatus, TelemetryReading};

/// Shared handle to the single canonical [`DeviceState`] record.
///
/// Cloning is cheap; all clones point at the same record.
#[derive(Debug, Clone)]
pub struct DeviceStateStore {
    inner: Arc<RwLock<DeviceState>>,
}

impl DeviceStateStore {
    /// Create the store with `started_at` as the initial `last_seen`, so a
    /// device that never speaks is measured against process start.
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(DeviceState::new(started_at))),
        }
    }

    /// Point-in-time copy of the record.
    pub async fn snapshot(&self) -> DeviceState {
        self.inner.read().await.clone()
    }

    /// Merge an accepted telemetry reading.
    pub async fn apply_telemetry(&self, reading: &TelemetryReading, now: DateTime<Utc>) {
        self.inner.write().await.merge_telemetry(reading, now);
    }

    /// Overwrite the relay set from an accepted status report.
    pub async fn apply_status(&self, status: &RelayStatus, now: DateTime<Utc>) {
        self.inner.write().await.apply_status(status, now);
    }

    /// Record a heartbeat: the device just proved it is alive.
    pub async fn mark_heartbeat(&self, now: DateTime<Utc>) {
        self.inner.write().await.mark_seen(now);
    }

    /// Force the device offline.
    pub async fn mark_offline(&self) {
        self.inner.write().await.mark_offline();
    }

    /// Demote to offline if the device has been silent longer than
    /// `window`. Returns `true` when a transition actually happened, so the
    /// monitor only logs real demotions.
    pub async fn mark_offline_if_silent(&self, window: Duration, now: DateTime<Utc>) -> bool {
        let window = chrono::Duration::from_std(window).unwrap_or(chrono::Duration::MAX);
        let mut state = self.inner.write().await;
        if state.online && state.silent_for(now) > window {
            state.mark_offline();
            return true;
        }
        false
    }
}
