use crate::domain::ports::{EventLog, LogEntry, Notifier};
use tracing::error;

/// Emits log entries as `tracing` error events.
///
/// Each placeholder becomes a field (without its `@`), the rendered template
/// becomes the event message.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventLog;

impl EventLog for TracingEventLog {
    fn log(&self, entry: LogEntry) {
        let message = entry.render();
        let status = entry.variable("@status").unwrap_or_default();
        let gateway_message = entry.variable("@message").unwrap_or_default();
        let pid = entry.variable("@pid").unwrap_or_default();
        let pmid = entry.variable("@pmid").unwrap_or_default();
        let method = entry.variable("@method").unwrap_or_default();

        error!(
            scope = entry.scope,
            status,
            gateway_message,
            pid,
            pmid,
            method,
            "{message}"
        );
    }
}

/// Prints user-facing messages to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, message: &str) {
        eprintln!("{message}");
    }
}
