//! Fire-and-forget product analytics and error capture.
//!
//! Both services are plain values handed to the code that needs them, so
//! tests can construct isolated instances instead of sharing process-wide
//! state.

mod types;
mod writer;

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub use types::{AnalyticsEvent, CapturedError};
pub use writer::EventWriter;

use crate::shared::now_ms;

const RECENT_ERROR_CAP: usize = 50;

/// Records named events with JSON properties. Tracking never blocks and
/// never fails the caller; a dropped event is just lost telemetry.
pub struct Analytics {
    session: String,
    writer: Option<EventWriter>,
}

impl Analytics {
    /// Spawn the event writer for `dir` (events land in `dir`/events).
    pub fn spawn(dir: &Path) -> Arc<Self> {
        let session = format!("{:x}-{:08x}", now_ms(), rand::random::<u32>());
        let writer = EventWriter::spawn(dir.join("events"));
        Arc::new(Self {
            session,
            writer: Some(writer),
        })
    }

    /// An instance that drops everything. For tests and headless runs.
    pub fn disabled() -> Arc<Self> {
        Arc::new(Self {
            session: "disabled".to_string(),
            writer: None,
        })
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    pub fn track(&self, name: &str, properties: serde_json::Value) {
        tracing::debug!(target: "events", event = name, "Tracked");
        if let Some(writer) = &self.writer {
            writer.send(AnalyticsEvent {
                ts: now_ms(),
                session: self.session.clone(),
                name: name.to_string(),
                properties,
            });
        }
    }
}

/// Keeps the most recent captured errors in memory and mirrors each one
/// to analytics.
pub struct ErrorMonitor {
    analytics: Arc<Analytics>,
    recent: Mutex<VecDeque<CapturedError>>,
}

impl ErrorMonitor {
    pub fn new(analytics: Arc<Analytics>) -> Self {
        Self {
            analytics,
            recent: Mutex::new(VecDeque::with_capacity(RECENT_ERROR_CAP)),
        }
    }

    pub fn capture(&self, source: &str, message: &str) {
        let error = CapturedError {
            ts: now_ms(),
            source: source.to_string(),
            message: message.to_string(),
        };

        {
            let mut recent = self.recent.lock().unwrap();
            if recent.len() == RECENT_ERROR_CAP {
                recent.pop_front();
            }
            recent.push_back(error.clone());
        }

        self.analytics.track(
            "error_captured",
            serde_json::json!({ "source": source, "message": message }),
        );
    }

    pub fn recent(&self) -> Vec<CapturedError> {
        self.recent.lock().unwrap().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.recent.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_events_reach_daily_file() {
        let dir = tempfile::tempdir().unwrap();
        let analytics = Analytics::spawn(dir.path());

        analytics.track("task_added", serde_json::json!({ "priority": "high" }));
        analytics.track("task_completed", serde_json::json!({}));

        // Writer flushes on its interval.
        std::thread::sleep(Duration::from_millis(300));

        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        let path = dir.path().join("events").join(format!("{}.jsonl", date));
        let contents = std::fs::read_to_string(path).unwrap();

        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["name"], "task_added");
        assert_eq!(first["properties"]["priority"], "high");
        assert_eq!(first["session"], analytics.session());
    }

    #[test]
    fn test_disabled_analytics_tracks_nothing() {
        let analytics = Analytics::disabled();
        analytics.track("ignored", serde_json::json!({}));
        assert_eq!(analytics.session(), "disabled");
    }

    #[test]
    fn test_error_monitor_caps_recent_list() {
        let monitor = ErrorMonitor::new(Analytics::disabled());
        for i in 0..60 {
            monitor.capture("api", &format!("error {}", i));
        }

        let recent = monitor.recent();
        assert_eq!(recent.len(), RECENT_ERROR_CAP);
        assert_eq!(recent.first().unwrap().message, "error 10");
        assert_eq!(recent.last().unwrap().message, "error 59");

        monitor.clear();
        assert!(monitor.recent().is_empty());
    }
}
