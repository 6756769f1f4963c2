//! Export progress reporting
//!
//! Exporters report what they select through an injected sink rather than
//! printing or logging on their own; the CLI passes the tracing-backed sink,
//! tests pass the silent one.

/// Sink for export progress events.
pub trait ExportLog {
    /// A new output section is starting.
    fn section(&self, title: &str);

    /// An entity was selected for the current section.
    fn entity(&self, unique_name: &str);

    /// Freeform note (defaults taken, absences, skipped data).
    fn note(&self, message: &str);
}

/// Forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl ExportLog for TracingLog {
    fn section(&self, title: &str) {
        tracing::info!(section = title, "exporting");
    }

    fn entity(&self, unique_name: &str) {
        tracing::debug!(entity = unique_name, "selected");
    }

    fn note(&self, message: &str) {
        tracing::info!("{message}");
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLog;

impl ExportLog for NullLog {
    fn section(&self, _title: &str) {}
    fn entity(&self, _unique_name: &str) {}
    fn note(&self, _message: &str) {}
}
