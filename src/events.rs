//! State pushes to the webview.

use std::sync::Mutex;

use log::error;
use serde::Serialize;
use serde_json::Value;

pub const LIBRARY_CHANGED: &str = "library-changed";
pub const ANALYSIS_UPDATED: &str = "analysis-updated";
pub const PLAYER_COMMANDS: &str = "player-commands";
pub const OVERLAY_SETTINGS_UPDATED: &str = "overlay-settings-updated";

pub trait EventSink: Send + Sync {
    fn emit_value(&self, event: &str, payload: Value);
}

pub fn emit<T: Serialize>(sink: &dyn EventSink, event: &str, payload: &T) {
    match serde_json::to_value(payload) {
        Ok(value) => sink.emit_value(event, value),
        Err(err) => error!("failed to serialize {event} payload: {err}"),
    }
}

/// Drops every event. Used when the core runs without a webview.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit_value(&self, _event: &str, _payload: Value) {}
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(String, Value)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, Value)> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count(&self, event: &str) -> usize {
        self.events().iter().filter(|(name, _)| name == event).count()
    }

    pub fn last(&self, event: &str) -> Option<Value> {
        self.events()
            .into_iter()
            .rev()
            .find(|(name, _)| name == event)
            .map(|(_, payload)| payload)
    }
}

impl EventSink for RecordingSink {
    fn emit_value(&self, event: &str, payload: Value) {
        let mut guard = match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push((event.to_string(), payload));
    }
}

#[cfg(feature = "desktop")]
impl EventSink for tauri::AppHandle {
    fn emit_value(&self, event: &str, payload: Value) {
        use tauri::Emitter;

        if let Err(err) = self.emit(event, payload) {
            error!("failed to emit {event}: {err}");
        }
    }
}
