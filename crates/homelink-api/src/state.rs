//! Server state shared across handlers.

use std::sync::Arc;

use homelink_devices::{CommandDispatcher, DeviceStateStore};
use homelink_llm::IntentTranslator;

use crate::history::History;

/// Everything a handler can reach.
#[derive(Clone)]
pub struct ServerState {
    /// Canonical device state.
    pub store: DeviceStateStore,
    /// Command publisher.
    pub dispatcher: Arc<CommandDispatcher>,
    /// Free-text → intent translation.
    pub translator: Arc<IntentTranslator>,
    /// Telemetry and chat rings.
    pub history: History,
}

impl ServerState {
    pub fn new(
        store: DeviceStateStore,
        dispatcher: Arc<CommandDispatcher>,
        translator: Arc<IntentTranslator>,
        history: History,
    ) -> Self {
        Self {
            store,
            dispatcher,
            translator,
            history,
        }
    }
}
