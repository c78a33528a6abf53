//! Relay identifiers and actions.
//!
//! The controller exposes six independently addressable relays. The intent
//! classifier may refer to them by household name ("light", "fan", ...);
//! [`RelayId::parse`] normalizes those aliases so downstream code only ever
//! deals with canonical relay ids.

use serde::{Deserialize, Serialize};

/// One of the six relays on the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelayId {
    #[serde(rename = "relay1")]
    Relay1,
    #[serde(rename = "relay2")]
    Relay2,
    #[serde(rename = "relay3")]
    Relay3,
    #[serde(rename = "relay4")]
    Relay4,
    #[serde(rename = "relay5")]
    Relay5,
    #[serde(rename = "relay6")]
    Relay6,
}

impl RelayId {
    /// All relays, in wire order.
    pub const ALL: [RelayId; 6] = [
        RelayId::Relay1,
        RelayId::Relay2,
        RelayId::Relay3,
        RelayId::Relay4,
        RelayId::Relay5,
        RelayId::Relay6,
    ];

    /// Canonical wire identifier (`relay1`..`relay6`).
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayId::Relay1 => "relay1",
            RelayId::Relay2 => "relay2",
            RelayId::Relay3 => "relay3",
            RelayId::Relay4 => "relay4",
            RelayId::Relay5 => "relay5",
            RelayId::Relay6 => "relay6",
        }
    }

    /// Parse a relay id, accepting the household aliases the classifier
    /// uses for the reference installation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relay1" | "light" => Some(RelayId::Relay1),
            "relay2" | "fan" => Some(RelayId::Relay2),
            "relay3" | "ac" | "air_conditioner" => Some(RelayId::Relay3),
            "relay4" | "water_pump" | "pump" => Some(RelayId::Relay4),
            "relay5" | "heater" => Some(RelayId::Relay5),
            "relay6" | "extra" => Some(RelayId::Relay6),
            _ => None,
        }
    }
}

impl std::fmt::Display for RelayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Action applied to one relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayAction {
    On,
    Off,
    Toggle,
}

impl RelayAction {
    /// Wire form of the action (`on`/`off`/`toggle`).
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayAction::On => "on",
            RelayAction::Off => "off",
            RelayAction::Toggle => "toggle",
        }
    }

    /// Parse a wire action string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" => Some(RelayAction::On),
            "off" => Some(RelayAction::Off),
            "toggle" => Some(RelayAction::Toggle),
            _ => None,
        }
    }
}

impl std::fmt::Display for RelayAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
