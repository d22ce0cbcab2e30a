use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use chrono::Local;

use super::types::AnalyticsEvent;

const BUFFER_CAPACITY: usize = 32;
const FLUSH_INTERVAL_MS: u64 = 100;

/// Buffered event writer that appends to daily JSONL files
pub struct EventWriter {
    tx: Sender<AnalyticsEvent>,
}

impl EventWriter {
    /// Spawn the writer thread and return a handle to send events
    pub fn spawn(events_dir: PathBuf) -> Self {
        let (tx, rx) = mpsc::channel::<AnalyticsEvent>();

        thread::spawn(move || {
            writer_loop(rx, &events_dir);
        });

        Self { tx }
    }

    /// Send an event to the writer (fire-and-forget)
    pub fn send(&self, event: AnalyticsEvent) {
        let _ = self.tx.send(event);
    }
}

fn writer_loop(rx: Receiver<AnalyticsEvent>, events_dir: &Path) {
    let mut buffer: Vec<AnalyticsEvent> = Vec::with_capacity(BUFFER_CAPACITY);
    let timeout = Duration::from_millis(FLUSH_INTERVAL_MS);

    loop {
        match rx.recv_timeout(timeout) {
            Ok(event) => {
                buffer.push(event);
                if buffer.len() >= BUFFER_CAPACITY {
                    flush_buffer(&mut buffer, events_dir);
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if !buffer.is_empty() {
                    flush_buffer(&mut buffer, events_dir);
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                if !buffer.is_empty() {
                    flush_buffer(&mut buffer, events_dir);
                }
                break;
            }
        }
    }
}

fn flush_buffer(buffer: &mut Vec<AnalyticsEvent>, events_dir: &Path) {
    let date = Local::now().format("%Y-%m-%d").to_string();
    let path = events_dir.join(format!("{}.jsonl", date));

    if let Err(e) = write_events_to_file(&path, buffer) {
        tracing::warn!(target: "events", "Failed to write analytics events: {}", e);
    }

    buffer.clear();
}

fn write_events_to_file(path: &Path, events: &[AnalyticsEvent]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);

    for event in events {
        if let Ok(json) = serde_json::to_string(event) {
            writeln!(writer, "{}", json)?;
        }
    }

    writer.flush()?;
    Ok(())
}
