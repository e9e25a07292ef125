//! Capability composition: entities that carry their journal and history as
//! owned fields instead of inheriting behavior.
//!
//! [`Tracked`] composes a record, a journal and a history series.
//! [`Journaled`] is the variant without history. Both run every mutation
//! through the same pipeline: stage, validate, commit, journal, then snapshot
//! (tracked only).
//!
//! # Invariants
//! - A failed validation leaves no record, journal entry or snapshot behind.
//! - Mutations are applied to a staged copy; the live record only changes once
//!   the staged copy passes the guard.
//! - Restoring a version journals the restore but never snapshots it.

mod builder;
mod error;
mod journaled;
mod tracked;

pub use builder::EntityBuilder;
pub use error::Error;
pub use journaled::Journaled;
pub use tracked::Tracked;
