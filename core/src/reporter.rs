//! Test-event signalling for helpers that do not assert.
//!
//! Overwrite helpers invert an assertion: they write what the API answered
//! into the fixture. That must never pass unnoticed, so every overwrite emits
//! a warning and marks the test risky through the `Reporter` handed to the
//! `ApiTester`.

use std::sync::{Arc, Mutex};

/// Receives warnings and risky markers, synchronously, from the helpers.
pub trait Reporter {
    fn warning(&self, message: &str);
    fn risky(&self, message: &str);
}

/// Emits every event as a `tracing` warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn warning(&self, message: &str) {
        tracing::warn!(target: "api_tester", "{message}");
    }

    fn risky(&self, message: &str) {
        tracing::warn!(target: "api_tester", risky = true, "test marked risky: {message}");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    Warning(String),
    Risky(String),
}

/// Keeps every event so a suite can inspect or fail on them.
///
/// Clones share the same event list. Events are also forwarded to
/// `TracingReporter`.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<ReportEvent>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.lock().clone()
    }

    pub fn is_risky(&self) -> bool {
        self.lock()
            .iter()
            .any(|event| matches!(event, ReportEvent::Risky(_)))
    }

    pub fn warnings(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                ReportEvent::Warning(message) => Some(message.clone()),
                ReportEvent::Risky(_) => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ReportEvent>> {
        // A panicking test must not hide the events recorded before it.
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Reporter for RecordingReporter {
    fn warning(&self, message: &str) {
        TracingReporter.warning(message);
        self.lock().push(ReportEvent::Warning(message.to_string()));
    }

    fn risky(&self, message: &str) {
        TracingReporter.risky(message);
        self.lock().push(ReportEvent::Risky(message.to_string()));
    }
}
