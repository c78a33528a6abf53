//! Core types for HomeLink.
//!
//! This crate defines the shared vocabulary of the bridge: the canonical
//! device state record, the wire payload schemas for each MQTT topic, relay
//! identifiers and actions, structured intents, and configuration.

pub mod command;
pub mod config;
pub mod intent;
pub mod relay;
pub mod state;

pub use command::DeviceCommand;
pub use config::{BridgeConfig, TopicSet};
pub use intent::{Intent, IntentKind};
pub use relay::{RelayAction, RelayId};
pub use state::{DeviceState, RelayStatus, TelemetryReading};

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::command::DeviceCommand;
    pub use crate::config::{BridgeConfig, TopicSet};
    pub use crate::intent::{Intent, IntentKind};
    pub use crate::relay::{RelayAction, RelayId};
    pub use crate::state::{DeviceState, RelayStatus, TelemetryReading};
}
