//! Lifecycle notification hook.
//!
//! The manager calls `notify` at each major transition (position opened,
//! position closed, saga failure). The surrounding application wires the
//! trait to whatever alerting channel it uses; the default implementation
//! just logs.

use parking_lot::Mutex;
use tracing::info;

/// Sink for human-readable lifecycle notifications.
pub trait Notifier: Send + Sync {
    /// Deliver a notification. Must not block for long and must not fail
    /// loudly: alerting problems never abort a trading operation.
    fn notify(&self, message: &str);
}

/// Default notifier that writes to the structured log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        info!(target: "clm::notify", "{message}");
    }
}

/// Test notifier that records every message.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}
