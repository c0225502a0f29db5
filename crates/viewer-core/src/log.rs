//! Session log sink.
//!
//! Navigation and polling report their progress through an injected
//! [`LogSink`] rather than a global console, so a front-end can show the
//! trail of a link resolution while the process log still receives it.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Entries kept by the debug console before the oldest is dropped
pub const DEBUG_CONSOLE_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Key/value context attached to a log line.
pub type Details<'a> = &'a [(&'a str, String)];

pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str, details: Details<'_>);

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message, &[]);
    }

    fn success(&self, message: &str) {
        self.log(LogLevel::Success, message, &[]);
    }

    fn warning(&self, message: &str, details: Details<'_>) {
        self.log(LogLevel::Warning, message, details);
    }
}

/// Forwards to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, message: &str, details: Details<'_>) {
        let details = format_details(details);
        match level {
            LogLevel::Info => tracing::debug!("{}{}", message, details),
            LogLevel::Success => tracing::info!("{}{}", message, details),
            LogLevel::Warning => tracing::warn!("{}{}", message, details),
            LogLevel::Error => tracing::error!("{}{}", message, details),
        }
    }
}

fn format_details(details: Details<'_>) -> String {
    details
        .iter()
        .map(|(key, value)| format!(" {}={}", key, value))
        .collect()
}

/// A recorded log line.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub details: Vec<(String, String)>,
    /// Milliseconds since Unix epoch
    pub timestamp: u64,
}

/// Bounded in-memory log, also forwarded to `tracing`.
pub struct DebugConsole {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
}

impl DebugConsole {
    pub fn new() -> Self {
        Self::with_capacity(DEBUG_CONSOLE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Snapshot of the recorded entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    /// Messages recorded at `level`, oldest first.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl Default for DebugConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for DebugConsole {
    fn log(&self, level: LogLevel, message: &str, details: Details<'_>) {
        TracingSink.log(level, message, details);

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let entry = LogEntry {
            level,
            message: message.to_string(),
            details: details
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            timestamp,
        };

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        while entries.len() >= self.capacity.max(1) {
            entries.pop_front();
        }
        entries.push_back(entry);
    }
}
