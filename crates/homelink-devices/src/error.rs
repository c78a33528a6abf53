//! Device-side error taxonomy.

use thiserror::Error;

/// Errors surfaced by the device bridge.
///
/// Malformed inbound payloads are deliberately absent: the ingestor
/// recovers from those locally and never raises.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Broker connection could not be established or configured.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A publish could not be handed to the MQTT client.
    #[error("Publish error: {0}")]
    Publish(String),

    /// A payload could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
