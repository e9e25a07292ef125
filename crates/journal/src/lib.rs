//! Audit journal: leveled, timestamped messages per entity instance.
//!
//! Storage and presentation are separate. A [`Journal`] stores entries; every
//! append is also handed to a [`JournalSink`] (tracing, memory, nothing), which
//! is a side channel and never part of the stored state.
//!
//! # Invariants
//! - Entries are append-only and insertion-ordered.
//! - Entry timestamps never decrease.
//! - Levels are an open set; no level is ever rejected.
//! - Exports are read-only.

pub mod export;
pub mod journal;
pub mod level;
pub mod sink;

pub use export::{JournalError, JournalFormat};
pub use journal::{Journal, JournalEntry};
pub use level::{Level, Severity};
pub use sink::{JournalSink, MemorySink, NullSink, TracingSink};
