//! History engine: point-in-time snapshots of entity state, an append-only
//! series per entity, diffing and restore.
//!
//! # Invariants
//! - A series is append-only; index 0 is the oldest snapshot.
//! - Timestamps within a series never decrease.
//! - Snapshots own deep copies of attribute values and are verifiable by digest.
//! - Restore writes state back into the entity but never appends to the series.

pub mod series;
pub mod snapshot;

pub use series::{ChangeSet, HistoryError, HistorySeries, RestoredVersion};
pub use snapshot::{Snapshot, diff};
