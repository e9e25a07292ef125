use crate::builder::EntityBuilder;
use crate::error::Error;
use quill_common::{Clock, EntityKey};
use quill_export::Tabular;
use quill_journal::{Journal, JournalEntry, Level};
use quill_model::{Entity, MODIFIED_AT, Record, Schema, Value, guard};
use std::sync::Arc;

/// An entity with a journal but no version history.
#[derive(Debug)]
pub struct Journaled {
    record: Record,
    journal: Journal,
    clock: Arc<dyn Clock>,
}

impl Journaled {
    pub fn builder(schema: Arc<Schema>) -> EntityBuilder<Journaled> {
        EntityBuilder::new(schema)
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.record.get(name)
    }

    /// Stage, validate, commit, then journal `message`.
    pub fn update<F>(&mut self, message: impl Into<String>, mutate: F) -> Result<(), Error>
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
        Ok(())
    }

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

    pub fn to_json(&self) -> String {
        quill_export::to_json(self, None)
    }

    pub fn to_xml(&self) -> String {
        quill_export::to_xml(self, None)
    }

    pub fn export_journal(&self, format: &str) -> Result<String, Error> {
        Ok(self.journal.export_as(format)?)
    }
}

impl EntityBuilder<Journaled> {
    /// Validate the staged values, then journal `message`.
    pub fn create(self, message: impl Into<String>) -> Result<Journaled, Error> {
        let staged = self.stage()?;
        let mut journaled = Journaled {
            record: staged.record,
            journal: staged.journal,
            clock: staged.clock,
        };
        journaled.journal.log(message);
        Ok(journaled)
    }
}

impl Entity for Journaled {
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

impl Tabular for Journaled {}
