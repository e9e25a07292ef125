//! Developer tooling: read-only inspection of composed entities.
//!
//! # Invariants
//! - Inspection never mutates an entity, its journal or its history.

mod inspector;

pub use inspector::{EntityInspector, EntitySummary};
