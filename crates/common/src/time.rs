//! Wall-clock timestamps and the clock abstraction entities read them from.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// A UTC wall-clock instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Build from milliseconds since the Unix epoch. Out-of-range input maps to the epoch.
    pub fn from_millis(millis: i64) -> Self {
        Self(DateTime::from_timestamp_millis(millis).unwrap_or_default())
    }

    pub fn millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// RFC 3339 / ISO-8601 form used by every serialized output.
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Parse the form produced by [`Timestamp::to_iso8601`] (any RFC 3339 offset is accepted).
    pub fn parse_iso8601(s: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }

    /// Human-facing `YYYY-MM-DD HH:MM:SS` form used in text reports.
    pub fn display_seconds(&self) -> String {
        self.0.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Source of wall-clock time for journals and histories.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Timestamp;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to. Deterministic time for tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn starting_at(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    pub fn advance_millis(&self, delta: i64) {
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }

    pub fn set_millis(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso8601_roundtrip() {
        let ts = Timestamp::from_millis(1_700_000_000_123);
        let text = ts.to_iso8601();
        assert_eq!(text, "2023-11-14T22:13:20.123000Z");
        assert_eq!(Timestamp::parse_iso8601(&text), Some(ts));
    }

    #[test]
    fn display_seconds_drops_fraction() {
        let ts = Timestamp::from_millis(1_700_000_000_999);
        assert_eq!(ts.display_seconds(), "2023-11-14 22:13:20");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Timestamp::parse_iso8601("yesterday").is_none());
    }

    #[test]
    fn manual_clock_moves_only_when_advanced() {
        let clock = ManualClock::starting_at(1_000);
        assert_eq!(clock.now().millis(), 1_000);
        assert_eq!(clock.now().millis(), 1_000);
        clock.advance_millis(250);
        assert_eq!(clock.now().millis(), 1_250);
        clock.set_millis(10);
        assert_eq!(clock.now().millis(), 10);
    }

    #[test]
    fn system_clock_is_recent() {
        let ts = SystemClock.now();
        assert!(ts.millis() > 1_600_000_000_000);
    }
}
