//! Heartbeat-silence liveness monitor.
//!
//! Runs independently of message arrival: the only transition it makes is
//! online → offline after the silence window. The way back online is a
//! message through the ingestor; the monitor never promotes.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::info;

use homelink_core::config::{defaults, LivenessSettings};

use crate::store::DeviceStateStore;

/// Periodic online → offline demotion based on heartbeat silence.
pub struct LivenessMonitor {
    store: DeviceStateStore,
    window: Duration,
    poll_interval: Duration,
}

impl LivenessMonitor {
    /// Monitor `store` with the default 120 s window and 30 s tick.
    pub fn new(store: DeviceStateStore) -> Self {
        Self {
            store,
            window: Duration::from_secs(defaults::LIVENESS_WINDOW_SECS),
            poll_interval: Duration::from_secs(defaults::LIVENESS_POLL_SECS),
        }
    }

    /// Monitor `store` with configured settings.
    pub fn from_settings(store: DeviceStateStore, settings: &LivenessSettings) -> Self {
        Self {
            store,
            window: settings.window,
            poll_interval: settings.poll_interval,
        }
    }

    /// Set the silence window.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Set the tick interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// One evaluation of the transition rule at `now`.
    pub async fn check(&self, now: DateTime<Utc>) {
        if self.store.mark_offline_if_silent(self.window, now).await {
            info!(
                window_secs = self.window.as_secs(),
                "device silent past liveness window, marked offline"
            );
        }
    }

    /// Run the monitor loop forever.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        // The first tick fires immediately; that is fine, the device is
        // simply re-evaluated against process start.
        loop {
            ticker.tick().await;
            self.check(Utc::now()).await;
        }
    }

    /// Spawn the monitor loop as a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn stays_online_inside_window() {
        let store = DeviceStateStore::new(t0());
        store.mark_heartbeat(t0()).await;

        let monitor = LivenessMonitor::new(store.clone());
        monitor.check(t0() + chrono::Duration::seconds(119)).await;
        assert!(store.snapshot().await.online);
    }

    #[tokio::test]
    async fn demotes_after_window() {
        let store = DeviceStateStore::new(t0());
        store.mark_heartbeat(t0()).await;

        let monitor = LivenessMonitor::new(store.clone());
        monitor.check(t0() + chrono::Duration::seconds(121)).await;
        assert!(!store.snapshot().await.online);
    }

    #[tokio::test]
    async fn never_promotes() {
        let store = DeviceStateStore::new(t0());
        let monitor = LivenessMonitor::new(store.clone());

        // Fresh store is offline; a check right away must not flip it on,
        // even though last_seen (process start) is recent.
        monitor.check(t0() + chrono::Duration::seconds(1)).await;
        assert!(!store.snapshot().await.online);
    }

    #[tokio::test]
    async fn honors_custom_window() {
        let store = DeviceStateStore::new(t0());
        store.mark_heartbeat(t0()).await;

        let monitor = LivenessMonitor::new(store.clone()).with_window(Duration::from_secs(10));
        monitor.check(t0() + chrono::Duration::seconds(11)).await;
        assert!(!store.snapshot().await.online);
    }
}
