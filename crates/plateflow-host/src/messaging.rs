//! Operator messaging.
//!
//! The host shows notices to the operator and decides what to do with
//! them. Only a [`StopSignal`] is binding: the run must halt.

use serde::Serialize;
use tracing::{error, info, warn};

/// How urgent a notice is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Warning,
    /// The operator may elect to shut the run down.
    Serious,
    /// The run is being stopped.
    Fatal,
}

/// A message for the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub detail: String,
}

impl Notice {
    pub fn new(severity: Severity, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            detail: detail.into(),
        }
    }
}

/// One-way instruction to the host to halt the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopSignal {
    pub severity: Severity,
    pub message: String,
}

impl StopSignal {
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Fatal,
            message: message.into(),
        }
    }
}

/// Sink for operator notices.
pub trait Messenger {
    fn notify(&mut self, notice: Notice);
}

/// Forwards notices to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMessenger;

impl Messenger for TracingMessenger {
    fn notify(&mut self, notice: Notice) {
        log_notice(&notice);
    }
}

/// Keeps every notice, and logs it.
#[derive(Debug, Default, Clone)]
pub struct RecordingMessenger {
    notices: Vec<Notice>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

impl Messenger for RecordingMessenger {
    fn notify(&mut self, notice: Notice) {
        log_notice(&notice);
        self.notices.push(notice);
    }
}

fn log_notice(notice: &Notice) {
    match notice.severity {
        Severity::Normal => info!(title = %notice.title, "{}", notice.detail),
        Severity::Warning | Severity::Serious => {
            warn!(title = %notice.title, severity = ?notice.severity, "{}", notice.detail)
        }
        Severity::Fatal => error!(title = %notice.title, "{}", notice.detail),
    }
}
