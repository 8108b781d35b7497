//! Append-only event log.
//!
//! Entries are created by the session layer when something observable
//! happens and are never mutated or removed afterwards.

use chrono::Local;

/// What kind of activity a [`LogEntry`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    Connect,
    Disconnect,
    Error,
    Inbound,
    Outbound,
}

impl LogCategory {
    /// Returns a short label suitable for tracing output.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Connect => "connect",
            LogCategory::Disconnect => "disconnect",
            LogCategory::Error => "error",
            LogCategory::Inbound => "inbound",
            LogCategory::Outbound => "outbound",
        }
    }
}

/// A single immutable line of the event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    category: LogCategory,
    text: String,
    timestamp: String,
}

impl LogEntry {
    /// Create an entry stamped with the local wall-clock time.
    pub fn new(category: LogCategory, text: impl Into<String>) -> Self {
        Self::with_timestamp(category, text, Local::now().format("%H:%M:%S").to_string())
    }

    pub fn with_timestamp(
        category: LogCategory,
        text: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            category,
            text: text.into(),
            timestamp: timestamp.into(),
        }
    }

    pub fn category(&self) -> LogCategory {
        self.category
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

/// Ordered, append-only sequence of [`LogEntry`] values.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry at the end of the log.
    pub fn append(&mut self, entry: LogEntry) {
        tracing::debug!(
            category = entry.category.as_str(),
            "log entry: {}",
            entry.text
        );
        self.entries.push(entry);
    }

    /// Read-only view of every entry in insertion order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }
}
