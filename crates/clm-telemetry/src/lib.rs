//! Structured logging and lifecycle notifications.
//!
//! - Structured JSON logging with tracing (pretty output in development)
//! - The `Notifier` hook invoked at major lifecycle transitions

pub mod error;
pub mod logging;
pub mod notifier;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use notifier::{LogNotifier, Notifier, RecordingNotifier};
