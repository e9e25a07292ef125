use crate::error::Error;
use quill_common::{Clock, EntityKey, SystemClock};
use quill_journal::{Journal, JournalSink, Level, TracingSink};
use quill_model::{CREATED_AT, MODIFIED_AT, Record, Schema, Value, guard};
use std::marker::PhantomData;
use std::sync::Arc;

/// Configures a composed entity before its creation.
///
/// The type parameter selects the composed type produced by `create`; see
/// [`crate::Tracked::builder`] and [`crate::Journaled::builder`]. Values given to
/// [`EntityBuilder::set`] are only checked at `create`, so a misconfigured
/// builder never leaves partial state behind.
#[derive(Debug)]
pub struct EntityBuilder<T> {
    schema: Arc<Schema>,
    key: Option<EntityKey>,
    level: Level,
    sink: Arc<dyn JournalSink>,
    clock: Arc<dyn Clock>,
    values: Vec<(String, Value)>,
    _target: PhantomData<fn() -> T>,
}

/// Validated pieces handed to the composed type.
pub(crate) struct Staged {
    pub record: Record,
    pub journal: Journal,
    pub clock: Arc<dyn Clock>,
}

impl<T> EntityBuilder<T> {
    pub(crate) fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            key: None,
            level: Level::INFO,
            sink: Arc::new(TracingSink),
            clock: Arc::new(SystemClock),
            values: Vec::new(),
            _target: PhantomData,
        }
    }

    /// Use a fixed key instead of a fresh one.
    pub fn key(mut self, key: EntityKey) -> Self {
        self.key = Some(key);
        self
    }

    /// Default journal level.
    pub fn level(mut self, level: impl Into<Level>) -> Self {
        self.level = level.into();
        self
    }

    pub fn sink(mut self, sink: Arc<dyn JournalSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Stage an initial attribute value.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((name.into(), value.into()));
        self
    }

    /// Build the record and run the guard. Nothing is journaled yet.
    pub(crate) fn stage(self) -> Result<Staged, Error> {
        let mut record = match self.key {
            Some(key) => Record::with_key(self.schema.clone(), key),
            None => Record::new(self.schema.clone()),
        };
        for (name, value) in self.values {
            record.set(&name, value)?;
        }
        if self.schema.is_timestamped() {
            let now = self.clock.now();
            record.set(CREATED_AT, now)?;
            record.set(MODIFIED_AT, now)?;
        }
        guard::check_required(&record)?;

        let journal = Journal::new(self.schema.type_name())
            .with_level(self.level)
            .with_sink(self.sink)
            .with_clock(self.clock.clone());
        Ok(Staged {
            record,
            journal,
            clock: self.clock,
        })
    }
}
