//! Structured intents produced by the translator.

use serde::{Deserialize, Serialize};

use crate::relay::{RelayAction, RelayId};

/// What the operator asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    TurnOn,
    TurnOff,
    Toggle,
    /// A question about current readings or relay states.
    Status,
    /// General conversation, no device involvement.
    Question,
    /// Translation failed; the reply carries an apology.
    Error,
}

impl IntentKind {
    /// Wire identifier used in the classifier schema.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::TurnOn => "turn_on",
            IntentKind::TurnOff => "turn_off",
            IntentKind::Toggle => "toggle",
            IntentKind::Status => "status",
            IntentKind::Question => "question",
            IntentKind::Error => "error",
        }
    }

    /// Parse a classifier intent string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "turn_on" => Some(IntentKind::TurnOn),
            "turn_off" => Some(IntentKind::TurnOff),
            "toggle" => Some(IntentKind::Toggle),
            "status" => Some(IntentKind::Status),
            "question" => Some(IntentKind::Question),
            "error" => Some(IntentKind::Error),
            _ => None,
        }
    }

    /// The relay action this intent maps to, if it is a device action.
    pub fn relay_action(&self) -> Option<RelayAction> {
        match self {
            IntentKind::TurnOn => Some(RelayAction::On),
            IntentKind::TurnOff => Some(RelayAction::Off),
            IntentKind::Toggle => Some(RelayAction::Toggle),
            _ => None,
        }
    }
}

/// The structured result of interpreting one operator message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub kind: IntentKind,
    /// Target relay; `None` for status/question/error intents.
    pub device: Option<RelayId>,
    /// Operator-facing reply text.
    pub reply: String,
    pub action_needed: bool,
}

impl Intent {
    /// Fallback intent for any translation failure.
    pub fn fallback(reply: impl Into<String>) -> Self {
        Self {
            kind: IntentKind::Error,
            device: None,
            reply: reply.into(),
            action_needed: false,
        }
    }

    /// Enforce the intent invariant: `action_needed` requires a target
    /// device and an actionable kind. A violating intent is demoted to a
    /// non-action rather than rejected, so the operator still gets a reply.
    pub fn normalized(mut self) -> Self {
        if self.action_needed && (self.device.is_none() || self.kind.relay_action().is_none()) {
            self.action_needed = false;
        }
        self
    }

    /// The `(device, action)` pair to dispatch, when one is needed.
    pub fn command_parts(&self) -> Option<(RelayId, RelayAction)> {
        if !self.action_needed {
            return None;
        }
        Some((self.device?, self.kind.relay_action()?))
    }
}
