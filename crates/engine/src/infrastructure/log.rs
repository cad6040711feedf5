//! Log sink implementations.

use crate::infrastructure::ports::LogPort;

/// Forwards severe messages to `tracing` at error level.
pub struct TracingLog;

impl TracingLog {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingLog {
    fn default() -> Self {
        Self::new()
    }
}

impl LogPort for TracingLog {
    fn severe(&self, message: &str) {
        tracing::error!(target: "groupbridge", "{}", message);
    }
}

/// Collects messages in memory for tests that care about log contents but
/// not call expectations.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingLog(pub std::sync::Mutex<Vec<String>>);

#[cfg(test)]
impl RecordingLog {
    pub fn messages(&self) -> Vec<String> {
        self.0.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl LogPort for RecordingLog {
    fn severe(&self, message: &str) {
        if let Ok(mut messages) = self.0.lock() {
            messages.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn tracing_log_is_usable_as_log_port() {
        let log: Arc<dyn LogPort> = Arc::new(TracingLog::default());
        log.severe("Exception during WebGroupDao.secondary_groups: test message");
    }

    #[test]
    fn recording_log_keeps_messages_in_order() {
        let log = RecordingLog::default();
        log.severe("first");
        log.severe("second");

        assert_eq!(log.messages(), vec!["first", "second"]);
    }
}
