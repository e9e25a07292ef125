use crate::builder::EntityBuilder;
use crate::error::Error;
use quill_common::{Clock, EntityKey};
use quill_export::{Format, Tabular};
use quill_history::{HistorySeries, RestoredVersion, Snapshot};
use quill_journal::{Journal, JournalEntry, Level};
use quill_model::{Entity, MODIFIED_AT, Record, Schema, Value, guard};
use std::collections::BTreeSet;
use std::sync::Arc;

/// An entity with a journal and a version history.
///
/// Every committed mutation journals its message and then snapshots the new
/// state. Reads go through the [`Entity`] contract, so a `Tracked` can be
/// handed directly to the serializers.
#[derive(Debug)]
pub struct Tracked {
    record: Record,
    journal: Journal,
    history: HistorySeries,
    clock: Arc<dyn Clock>,
}

impl Tracked {
    pub fn builder(schema: Arc<Schema>) -> EntityBuilder<Tracked> {
        EntityBuilder::new(schema)
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn history(&self) -> &HistorySeries {
        &self.history
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.record.get(name)
    }

    /// Apply `mutate` to a staged copy, validate it, then commit.
    ///
    /// On commit `modified_at` is refreshed (for timestamped schemas), `message`
    /// is journaled and a snapshot labelled `action` is appended. If `mutate`
    /// or the guard fails, the entity is left untouched.
    pub fn update<F>(
        &mut self,
        action: impl Into<String>,
        message: impl Into<String>,
        mutate: F,
    ) -> Result<&Snapshot, Error>
    where
        F: FnOnce(&mut Record) -> Result<(), Error>,
    {
        let mut staged = self.record.clone();
        mutate(&mut staged)?;
        guard::check_required(&staged)?;
        if staged.schema().is_timestamped() {
            staged.set(MODIFIED_AT, self.clock.now())?;
        }

        self.record = staged;
        self.journal.log(message);
        Ok(self
            .history
            .snapshot(&self.record, action, self.clock.as_ref()))
    }

    /// Snapshot the current state without changing it.
    pub fn checkpoint(&mut self, action: impl Into<String>) -> &Snapshot {
        self.history
            .snapshot(&self.record, action, self.clock.as_ref())
    }

    /// Refresh `modified_at` and journal the move, as `from HH:MM:SS to HH:MM:SS`.
    ///
    /// A no-op for schemas without timestamps.
    pub fn touch(&mut self, operation: &str) -> Result<(), Error> {
        if !self.record.schema().is_timestamped() {
            return Ok(());
        }
        let now = self.clock.now();
        let previous = self.record.set(MODIFIED_AT, now)?;
        let from = previous
            .as_ref()
            .and_then(Value::as_timestamp)
            .map(|ts| ts.0.format("%H:%M:%S").to_string())
            .unwrap_or_default();
        self.journal.log(format!(
            "Timestamped: {operation} - from {from} to {}",
            now.0.format("%H:%M:%S")
        ));
        Ok(())
    }

    /// Bring back the version at `index` (negative counts from the end).
    ///
    /// The restore is journaled; the history is left as it was.
    pub fn restore(&mut self, index: isize) -> Result<RestoredVersion, Error> {
        let restored = self.history.restore(index, &mut self.record)?;
        self.journal.log(format!(
            "State restored from {} ({})",
            restored.timestamp.display_seconds(),
            restored.action
        ));
        Ok(restored)
    }

    /// Journal at the default level.
    pub fn log(&mut self, message: impl Into<String>) -> &JournalEntry {
        self.journal.log(message)
    }

    pub fn log_at(
        &mut self,
        level: impl Into<Level>,
        message: impl Into<String>,
    ) -> &JournalEntry {
        self.journal.log_at(level, message)
    }

    /// Attributes that differ between versions `a` and `b`.
    pub fn diff(&self, a: isize, b: isize) -> Result<BTreeSet<String>, Error> {
        Ok(self.history.diff(a, b)?)
    }

    pub fn to_json(&self, include_history: bool) -> String {
        quill_export::to_json(self, include_history.then_some(&self.history))
    }

    /// XML including the version history.
    pub fn to_xml(&self) -> String {
        quill_export::to_xml(self, Some(&self.history))
    }

    pub fn to_csv(&self) -> Result<String, Error> {
        Ok(quill_export::to_csv(self)?)
    }

    /// Export in a named format (`json`, `csv`, `xml`), history included.
    pub fn export(&self, format: &str) -> Result<String, Error> {
        let format: Format = format.parse()?;
        Ok(quill_export::render(self, format, Some(&self.history))?)
    }

    /// Export the journal (`text`, `json`, `csv`).
    pub fn export_journal(&self, format: &str) -> Result<String, Error> {
        Ok(self.journal.export_as(format)?)
    }
}

impl EntityBuilder<Tracked> {
    /// Validate the staged values, journal `message`, then snapshot as `action`.
    ///
    /// On failure nothing is created: no journal entry, no snapshot.
    pub fn create(
        self,
        action: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Tracked, Error> {
        let staged = self.stage()?;
        let mut tracked = Tracked {
            history: HistorySeries::for_schema(staged.record.schema()),
            record: staged.record,
            journal: staged.journal,
            clock: staged.clock,
        };
        tracked.journal.log(message);
        tracked
            .history
            .snapshot(&tracked.record, action, tracked.clock.as_ref());
        tracing::debug!(
            entity = tracked.type_name(),
            key = %tracked.key(),
            "tracked entity created"
        );
        Ok(tracked)
    }
}

impl Entity for Tracked {
    fn schema(&self) -> &Schema {
        self.record.schema()
    }

    fn key(&self) -> EntityKey {
        self.record.key()
    }

    fn value_of(&self, name: &str) -> Option<&Value> {
        self.record.value_of(name)
    }
}

impl Tabular for Tracked {}
