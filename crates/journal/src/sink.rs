//! Presentation side channel for journal appends.

use crate::journal::JournalEntry;
use crate::level::Severity;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Receives every entry as it is appended. Emission never affects stored state.
pub trait JournalSink: Send + Sync + fmt::Debug {
    fn emit(&self, type_name: &str, entry: &JournalEntry);
}

/// Routes entries into `tracing`, at a verbosity derived from the level label.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl JournalSink for TracingSink {
    fn emit(&self, type_name: &str, entry: &JournalEntry) {
        let level = entry.level().as_str();
        let message = entry.message();
        match entry.level().severity() {
            Severity::Error => tracing::error!(entity = type_name, label = level, "{message}"),
            Severity::Warn => tracing::warn!(entity = type_name, label = level, "{message}"),
            Severity::Info => tracing::info!(entity = type_name, label = level, "{message}"),
            Severity::Debug => tracing::debug!(entity = type_name, label = level, "{message}"),
            Severity::Trace => tracing::trace!(entity = type_name, label = level, "{message}"),
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl JournalSink for NullSink {
    fn emit(&self, _type_name: &str, _entry: &JournalEntry) {}
}

/// Collects emitted lines in memory, as `<Type> [LEVEL] YYYY-MM-DD HH:MM:SS: message`.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl JournalSink for MemorySink {
    fn emit(&self, type_name: &str, entry: &JournalEntry) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format!("{type_name} {}", entry.to_line()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use quill_common::Timestamp;

    #[test]
    fn memory_sink_collects_lines() {
        let sink = MemorySink::default();
        assert!(sink.is_empty());
        let entry = JournalEntry::new(Timestamp::from_millis(0), Level::WARNING, "late");
        sink.emit("Order", &entry);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.lines()[0], "Order [WARNING] 1970-01-01 00:00:00: late");
    }

    #[test]
    fn tracing_and_null_sinks_accept_all_levels() {
        let levels = [
            Level::ERROR,
            Level::WARNING,
            Level::INFO,
            Level::DEBUG,
            Level::new("TRACE"),
        ];
        for level in levels {
            let entry = JournalEntry::new(Timestamp::from_millis(0), level, "x");
            TracingSink.emit("Task", &entry);
            NullSink.emit("Task", &entry);
        }
    }
}
