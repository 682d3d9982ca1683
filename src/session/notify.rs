use std::sync::Mutex;

pub const EXPORT_SUCCESS: &str = "Video exported successfully!";
pub const EXPORT_CANCELLED: &str = "Export cancelled";

/// Notice shown when a recording cannot start or breaks off.
pub fn recording_failed(reason: impl std::fmt::Display) -> String {
    format!("Recording failed: {reason}")
}

/// One-line user notifications.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Sends notifications to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(target: "routecast::notify", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::warn!(target: "routecast::notify", "{message}");
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notice so far, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices().into_iter().map(|n| n.message).collect()
    }

    fn push(&self, level: NoticeLevel, message: &str) {
        if let Ok(mut n) = self.notices.lock() {
            n.push(Notice {
                level,
                message: message.to_string(),
            });
        }
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.push(NoticeLevel::Success, message);
    }

    fn error(&self, message: &str) {
        self.push(NoticeLevel::Error, message);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/notify.rs"]
mod tests;
