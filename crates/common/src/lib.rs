//! Shared types used by every quill crate.
//!
//! # Invariants
//! - Entity keys are unique per instance and never reused.
//! - Timestamps are UTC and render as RFC 3339 with microsecond precision.

pub mod time;
pub mod types;

pub use time::{Clock, ManualClock, SystemClock, Timestamp};
pub use types::EntityKey;
