use crate::export::{JournalError, JournalFormat};
use crate::level::Level;
use crate::sink::{JournalSink, TracingSink};
use quill_common::{Clock, SystemClock, Timestamp};
use std::sync::Arc;

/// One journal line. Immutable once appended.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    timestamp: Timestamp,
    level: Level,
    message: String,
}

impl JournalEntry {
    pub fn new(timestamp: Timestamp, level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            level,
            message: message.into(),
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// `[level] YYYY-MM-DD HH:MM:SS: message`
    pub fn to_line(&self) -> String {
        format!(
            "[{}] {}: {}",
            self.level,
            self.timestamp.display_seconds(),
            self.message
        )
    }
}

/// Append-only journal owned by one entity instance.
#[derive(Debug, Clone)]
pub struct Journal {
    type_name: String,
    default_level: Level,
    entries: Vec<JournalEntry>,
    sink: Arc<dyn JournalSink>,
    clock: Arc<dyn Clock>,
}

impl Journal {
    /// Create an empty journal at `INFO`, emitting through `tracing` and reading the system clock.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            default_level: Level::INFO,
            entries: Vec::new(),
            sink: Arc::new(TracingSink),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_level(mut self, level: impl Into<Level>) -> Self {
        self.default_level = level.into();
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn JournalSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Entity type name used in export banners.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn default_level(&self) -> &Level {
        &self.default_level
    }

    /// Append at the default level.
    pub fn log(&mut self, message: impl Into<String>) -> &JournalEntry {
        let level = self.default_level.clone();
        self.log_at(level, message)
    }

    /// Append at `level`, then hand the entry to the sink.
    pub fn log_at(
        &mut self,
        level: impl Into<Level>,
        message: impl Into<String>,
    ) -> &JournalEntry {
        let now = self.clock.now();
        let timestamp = match self.entries.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };
        let entry = JournalEntry::new(timestamp, level.into(), message);
        tracing::trace!(
            entity = %self.type_name,
            index = self.entries.len(),
            "journal append"
        );
        self.sink.emit(&self.type_name, &entry);
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn export(&self, format: JournalFormat) -> Result<String, JournalError> {
        match format {
            JournalFormat::Text => Ok(crate::export::to_text(self)),
            JournalFormat::Json => crate::export::to_json(self),
            JournalFormat::Csv => crate::export::to_csv(self),
        }
    }

    /// Parse `format` (`text`, `json`, `csv`) and export.
    pub fn export_as(&self, format: &str) -> Result<String, JournalError> {
        self.export(format.parse()?)
    }
}
