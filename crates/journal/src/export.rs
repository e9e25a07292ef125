//! Text, JSON and CSV renditions of a journal.

use crate::journal::Journal;
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("unsupported journal format `{0}`")]
    UnsupportedFormat(String),
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalFormat {
    Text,
    Json,
    Csv,
}

impl FromStr for JournalFormat {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(JournalError::UnsupportedFormat(s.to_string())),
        }
    }
}

#[derive(Serialize)]
struct JsonJournal<'a> {
    classe: &'a str,
    entrees: Vec<JsonEntry<'a>>,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    timestamp: String,
    niveau: &'a str,
    message: &'a str,
}

/// `Journal <Type>` banner, then one `[LEVEL] YYYY-MM-DD HH:MM:SS: message` line per entry.
pub fn to_text(journal: &Journal) -> String {
    let mut out = format!("Journal {}\n", journal.type_name());
    for entry in journal.entries() {
        out.push_str(&entry.to_line());
        out.push('\n');
    }
    out
}

pub fn to_json(journal: &Journal) -> Result<String, JournalError> {
    let doc = JsonJournal {
        classe: journal.type_name(),
        entrees: journal
            .entries()
            .iter()
            .map(|e| JsonEntry {
                timestamp: e.timestamp().to_iso8601(),
                niveau: e.level().as_str(),
                message: e.message(),
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

pub fn to_csv(journal: &Journal) -> Result<String, JournalError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(["timestamp", "niveau", "message"])?;
    for entry in journal.entries() {
        writer.write_record([
            entry.timestamp().to_iso8601().as_str(),
            entry.level().as_str(),
            entry.message(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| JournalError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::sink::NullSink;
    use pretty_assertions::assert_eq;
    use quill_common::ManualClock;
    use std::sync::Arc;

    fn task_journal() -> Journal {
        let clock = Arc::new(ManualClock::starting_at(1_700_000_000_000));
        let mut journal = Journal::new("Task")
            .with_clock(clock.clone())
            .with_sink(Arc::new(NullSink));
        journal.log("Task created");
        clock.advance_millis(1_500);
        journal.log_at(Level::SUCCESS, "Task done, \"on time\"");
        journal
    }

    #[test]
    fn text_export_has_banner_and_lines() {
        let text = task_journal().export(JournalFormat::Text).unwrap();
        assert_eq!(
            text,
            "Journal Task\n\
             [INFO] 2023-11-14 22:13:20: Task created\n\
             [SUCCESS] 2023-11-14 22:13:21: Task done, \"on time\"\n"
        );
    }

    #[test]
    fn csv_export_has_header_plus_one_row_per_entry() {
        let csv = task_journal().export_as("csv").unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "timestamp,niveau,message");
        assert_eq!(lines[1], "2023-11-14T22:13:20.000000Z,INFO,Task created");
        assert_eq!(
            lines[2],
            "2023-11-14T22:13:21.500000Z,SUCCESS,\"Task done, \"\"on time\"\"\""
        );
    }

    #[test]
    fn json_export_uses_journal_keys() {
        let json = task_journal().export_as("JSON").unwrap();
        let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(doc["classe"], "Task");
        let entries = doc["entrees"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["niveau"], "INFO");
        assert_eq!(entries[0]["timestamp"], "2023-11-14T22:13:20.000000Z");
        assert_eq!(entries[1]["message"], "Task done, \"on time\"");
    }

    #[test]
    fn export_is_idempotent() {
        let journal = task_journal();
        for format in [JournalFormat::Text, JournalFormat::Json, JournalFormat::Csv] {
            assert_eq!(
                journal.export(format).unwrap(),
                journal.export(format).unwrap()
            );
        }
        assert_eq!(journal.len(), 2);
    }

    #[test]
    fn empty_journal_exports() {
        let journal = Journal::new("Report").with_sink(Arc::new(NullSink));
        assert_eq!(journal.export(JournalFormat::Text).unwrap(), "Journal Report\n");
        assert_eq!(
            journal.export(JournalFormat::Csv).unwrap(),
            "timestamp,niveau,message\n"
        );
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = task_journal().export_as("yaml").unwrap_err();
        assert!(matches!(err, JournalError::UnsupportedFormat(ref f) if f == "yaml"));
        assert_eq!(err.to_string(), "unsupported journal format `yaml`");
    }
}
