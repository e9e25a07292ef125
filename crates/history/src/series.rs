use crate::snapshot::{Snapshot, diff};
use quill_common::{Clock, Timestamp};
use quill_model::{Entity, EntityMut, Schema, SchemaError, Value};
use std::collections::BTreeSet;

/// Errors from history operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HistoryError {
    #[error("history index {index} out of range for {len} snapshot(s)")]
    OutOfRange { index: isize, len: usize },
    #[error("snapshot does not fit the entity: {0}")]
    Schema(#[from] SchemaError),
}

/// What a restore brought back, for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredVersion {
    pub index: usize,
    pub timestamp: Timestamp,
    pub action: String,
}

/// One line of a changelog: a snapshot and what changed since its predecessor.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet {
    pub index: usize,
    pub timestamp: Timestamp,
    pub action: String,
    /// Empty for the first snapshot.
    pub changed: BTreeSet<String>,
}

/// Append-only, ordered snapshots of one entity instance.
#[derive(Debug, Clone, Default)]
pub struct HistorySeries {
    snapshots: Vec<Snapshot>,
    primary: Option<String>,
}

impl HistorySeries {
    /// Create an empty series with no primary attribute.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty series reporting the schema's primary attribute.
    pub fn for_schema(schema: &Schema) -> Self {
        Self {
            snapshots: Vec::new(),
            primary: schema.primary().map(str::to_string),
        }
    }

    /// Capture `entity` now and append it.
    pub fn snapshot<E: Entity + ?Sized>(
        &mut self,
        entity: &E,
        action: impl Into<String>,
        clock: &dyn Clock,
    ) -> &Snapshot {
        self.record(entity, action, clock.now())
    }

    /// Capture `entity` at `timestamp` and append it.
    ///
    /// A timestamp earlier than the newest snapshot is clamped to it, so the
    /// series stays non-decreasing even if the clock steps backwards.
    pub fn record<E: Entity + ?Sized>(
        &mut self,
        entity: &E,
        action: impl Into<String>,
        timestamp: Timestamp,
    ) -> &Snapshot {
        let timestamp = match self.snapshots.last() {
            Some(last) if last.timestamp() > timestamp => last.timestamp(),
            _ => timestamp,
        };
        let snap = Snapshot::capture(entity, action, timestamp);
        tracing::debug!(
            entity = entity.type_name(),
            index = self.snapshots.len(),
            action = snap.action(),
            "snapshot recorded"
        );
        self.snapshots.push(snap);
        &self.snapshots[self.snapshots.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// All snapshots, oldest first.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Resolve a possibly negative index (`-1` is the newest) to an absolute one.
    pub fn resolve(&self, index: isize) -> Result<usize, HistoryError> {
        let len = self.snapshots.len();
        let absolute = if index < 0 {
            len.checked_sub(index.unsigned_abs())
        } else {
            Some(index.unsigned_abs())
        };
        match absolute {
            Some(i) if i < len => Ok(i),
            _ => Err(HistoryError::OutOfRange { index, len }),
        }
    }

    pub fn get(&self, index: isize) -> Result<&Snapshot, HistoryError> {
        let i = self.resolve(index)?;
        Ok(&self.snapshots[i])
    }

    /// Attribute names that differ between two snapshots of this series.
    pub fn diff(&self, a: isize, b: isize) -> Result<BTreeSet<String>, HistoryError> {
        Ok(diff(self.get(a)?, self.get(b)?))
    }

    /// Write the snapshot at `index` back into `entity`.
    ///
    /// Every captured attribute is assigned; attributes the snapshot did not
    /// capture keep their live values. The whole snapshot is checked against the
    /// entity's schema first, so a mismatch leaves the entity untouched. The
    /// series itself is not modified.
    pub fn restore<E: EntityMut + ?Sized>(
        &self,
        index: isize,
        entity: &mut E,
    ) -> Result<RestoredVersion, HistoryError> {
        let i = self.resolve(index)?;
        let snap = &self.snapshots[i];

        for (name, value) in snap.attributes() {
            entity.schema().check(name, value)?;
        }
        for (name, value) in snap.attributes() {
            entity.assign(name, value.clone())?;
        }

        tracing::debug!(
            entity = entity.type_name(),
            index = i,
            action = snap.action(),
            "snapshot restored"
        );
        Ok(RestoredVersion {
            index: i,
            timestamp: snap.timestamp(),
            action: snap.action().to_string(),
        })
    }

    /// The primary attribute's value in the newest snapshot.
    pub fn latest_primary(&self) -> Option<&Value> {
        let primary = self.primary.as_deref()?;
        self.latest()?.get(primary)
    }

    /// Each snapshot with the attributes changed relative to its predecessor.
    pub fn changelog(&self) -> Vec<ChangeSet> {
        self.snapshots
            .iter()
            .enumerate()
            .map(|(i, snap)| ChangeSet {
                index: i,
                timestamp: snap.timestamp(),
                action: snap.action().to_string(),
                changed: match i.checked_sub(1) {
                    Some(prev) => diff(&self.snapshots[prev], snap),
                    None => BTreeSet::new(),
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_common::ManualClock;
    use quill_model::Record;
    use std::sync::Arc;

    fn invoice() -> Record {
        let schema = Schema::builder("Invoice")
            .text("title")
            .text("status")
            .number("amount")
            .primary("title")
            .build()
            .unwrap();
        let mut r = Record::new(Arc::new(schema));
        r.set("title", "Invoice 1").unwrap();
        r.set("amount", 100.0).unwrap();
        r
    }

    fn names(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn snapshot_appends_in_order() {
        let clock = ManualClock::starting_at(10);
        let r = invoice();
        let mut series = HistorySeries::for_schema(r.schema());
        series.snapshot(&r, "Create", &clock);
        clock.advance_millis(5);
        series.snapshot(&r, "Save", &clock);

        assert_eq!(series.len(), 2);
        assert_eq!(series.snapshots()[0].action(), "Create");
        assert_eq!(series.latest().unwrap().action(), "Save");
    }

    #[test]
    fn timestamps_never_decrease() {
        let clock = ManualClock::starting_at(1_000);
        let r = invoice();
        let mut series = HistorySeries::new();
        series.snapshot(&r, "a", &clock);
        clock.set_millis(500); // clock stepped backwards
        series.snapshot(&r, "b", &clock);
        clock.set_millis(2_000);
        series.snapshot(&r, "c", &clock);

        let ts: Vec<i64> = series
            .snapshots()
            .iter()
            .map(|s| s.timestamp().millis())
            .collect();
        assert_eq!(ts, [1_000, 1_000, 2_000]);
        assert!(
            series
                .snapshots()
                .windows(2)
                .all(|w| w[0].timestamp() <= w[1].timestamp())
        );
    }

    #[test]
    fn diff_between_create_and_update() {
        let clock = ManualClock::default();
        let mut r = invoice();
        let mut series = HistorySeries::new();
        series.snapshot(&r, "Create", &clock);
        r.set("amount", 150.0).unwrap();
        r.set("status", "sent").unwrap();
        series.snapshot(&r, "Update", &clock);

        assert_eq!(series.diff(0, 1).unwrap(), names(&["amount", "status"]));
        assert_eq!(series.diff(1, 0).unwrap(), names(&["amount", "status"]));
        assert!(series.diff(1, 1).unwrap().is_empty());
    }

    #[test]
    fn restore_first_of_three() {
        let clock = ManualClock::default();
        let mut r = invoice();
        let mut series = HistorySeries::new();
        series.snapshot(&r, "Create", &clock);
        r.set("title", "Invoice 1 (rev)").unwrap();
        series.snapshot(&r, "Rename", &clock);
        r.set("amount", 1.0).unwrap();
        series.snapshot(&r, "Discount", &clock);

        let restored = series.restore(0, &mut r).unwrap();
        assert_eq!(restored.index, 0);
        assert_eq!(restored.action, "Create");
        assert_eq!(r.get("title"), Some(&Value::from("Invoice 1")));
        assert_eq!(r.get("amount"), Some(&Value::Number(100.0)));
        // restore never appends
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn restore_leaves_uncaptured_attributes() {
        let clock = ManualClock::default();
        let mut r = invoice();
        let mut series = HistorySeries::new();
        series.snapshot(&r, "Create", &clock);
        r.set("status", "paid").unwrap();

        series.restore(-1, &mut r).unwrap();
        assert_eq!(r.get("status"), Some(&Value::from("paid")));
    }

    #[test]
    fn negative_index_matches_absolute() {
        let clock = ManualClock::default();
        let mut r = invoice();
        let mut series = HistorySeries::new();
        for i in 0..4 {
            r.set("amount", f64::from(i)).unwrap();
            series.snapshot(&r, format!("step {i}"), &clock);
        }
        assert_eq!(series.resolve(-1).unwrap(), series.len() - 1);
        assert_eq!(series.resolve(-4).unwrap(), 0);

        let mut a = r.clone();
        let mut b = r.clone();
        let ra = series.restore(-1, &mut a).unwrap();
        let rb = series.restore(series.len() as isize - 1, &mut b).unwrap();
        assert_eq!(ra, rb);
        assert_eq!(a, b);
    }

    #[test]
    fn restore_empty_series_is_out_of_range() {
        let mut r = invoice();
        let series = HistorySeries::new();
        assert_eq!(
            series.restore(0, &mut r).unwrap_err(),
            HistoryError::OutOfRange { index: 0, len: 0 }
        );
        assert!(series.restore(-1, &mut r).is_err());
    }

    #[test]
    fn out_of_range_both_directions() {
        let clock = ManualClock::default();
        let r = invoice();
        let mut series = HistorySeries::new();
        series.snapshot(&r, "Create", &clock);
        assert!(series.get(1).is_err());
        assert!(series.get(-2).is_err());
        assert!(series.get(isize::MIN).is_err());
        assert!(series.get(0).is_ok());
    }

    #[test]
    fn restore_rejects_foreign_snapshot() {
        let clock = ManualClock::default();
        let r = invoice();
        let mut series = HistorySeries::new();
        series.snapshot(&r, "Create", &clock);

        let other = Schema::builder("Note").text("body").build().unwrap();
        let mut note = Record::new(Arc::new(other));
        note.set("body", "untouched").unwrap();
        assert!(matches!(
            series.restore(0, &mut note),
            Err(HistoryError::Schema(_))
        ));
        assert_eq!(note.get("body"), Some(&Value::from("untouched")));
    }

    #[test]
    fn latest_primary_tracks_newest() {
        let clock = ManualClock::default();
        let mut r = invoice();
        let mut series = HistorySeries::for_schema(r.schema());
        assert!(series.latest_primary().is_none());
        series.snapshot(&r, "Create", &clock);
        r.set("title", "Invoice 2").unwrap();
        series.snapshot(&r, "Rename", &clock);
        assert_eq!(series.latest_primary(), Some(&Value::from("Invoice 2")));

        let plain = HistorySeries::new();
        assert!(plain.latest_primary().is_none());
    }

    #[test]
    fn changelog_lists_consecutive_changes() {
        let clock = ManualClock::default();
        let mut r = invoice();
        let mut series = HistorySeries::new();
        series.snapshot(&r, "Create", &clock);
        r.set("status", "sent").unwrap();
        series.snapshot(&r, "Send", &clock);
        series.snapshot(&r, "Touch", &clock);

        let log = series.changelog();
        assert_eq!(log.len(), 3);
        assert!(log[0].changed.is_empty());
        assert_eq!(log[1].changed, names(&["status"]));
        assert!(log[2].changed.is_empty());
        assert_eq!(log[1].action, "Send");
    }
}
