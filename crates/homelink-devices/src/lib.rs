//! Device-state reconciliation and command dispatch.
//!
//! This crate owns the canonical [`DeviceState`](homelink_core::DeviceState)
//! record and everything that touches it: the MQTT message ingestor, the
//! heartbeat-based liveness monitor, and the command dispatcher. The
//! reconciliation rules live in [`ingest`] as plain functions over the
//! store, so they are testable without a broker.

pub mod dispatch;
pub mod error;
pub mod ingest;
pub mod liveness;
pub mod mqtt;
pub mod store;

pub use dispatch::{CommandDispatcher, CommandSink};
pub use error::DeviceError;
pub use ingest::IngestEvent;
pub use liveness::LivenessMonitor;
pub use mqtt::MqttBridge;
pub use store::DeviceStateStore;
