use quill_common::Timestamp;
use quill_model::{Entity, Record, Value};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

/// An immutable copy of an entity's declared attributes at one instant.
///
/// The digest is computed over the timestamp, action and attribute values,
/// enabling corruption detection when snapshots are handed around.
#[derive(Debug, Clone)]
pub struct Snapshot {
    timestamp: Timestamp,
    action: String,
    attributes: BTreeMap<String, Value>,
    digest: String,
}

impl Snapshot {
    /// Copy every declared, currently-set attribute of `entity`.
    ///
    /// Walks the schema rather than the entity's storage, so only declared
    /// attributes are captured. Values are owned clones: nested records are
    /// copied whole and never alias the live entity.
    pub fn capture<E: Entity + ?Sized>(
        entity: &E,
        action: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        let attributes: BTreeMap<String, Value> = entity
            .schema()
            .attribute_names()
            .filter_map(|name| {
                entity
                    .value_of(name)
                    .map(|value| (name.to_string(), value.clone()))
            })
            .collect();
        let action = action.into();
        let digest = content_digest(timestamp, &action, &attributes);

        Self {
            timestamp,
            action,
            attributes,
            digest,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Human-readable label of the operation that produced this snapshot.
    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Hex SHA-256 of the snapshot content.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Verify the snapshot integrity by recomputing the digest.
    pub fn verify(&self) -> bool {
        content_digest(self.timestamp, &self.action, &self.attributes) == self.digest
    }

    /// Names whose values differ between `self` and `other`.
    pub fn diff(&self, other: &Snapshot) -> BTreeSet<String> {
        diff(self, other)
    }
}

/// The set of attribute names on which `a` and `b` disagree.
///
/// An attribute present in only one snapshot counts as a difference. The
/// result is symmetric and empty when comparing a snapshot with itself.
pub fn diff(a: &Snapshot, b: &Snapshot) -> BTreeSet<String> {
    a.attributes
        .keys()
        .chain(b.attributes.keys())
        .filter(|name| a.attributes.get(*name) != b.attributes.get(*name))
        .cloned()
        .collect()
}

fn content_digest(
    timestamp: Timestamp,
    action: &str,
    attributes: &BTreeMap<String, Value>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(timestamp.0.timestamp_micros().to_le_bytes());
    hash_str(&mut hasher, action);
    hash_map(&mut hasher, attributes);
    format!("{:x}", hasher.finalize())
}

fn hash_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

fn hash_map(hasher: &mut Sha256, values: &BTreeMap<String, Value>) {
    hasher.update((values.len() as u64).to_le_bytes());
    for (name, value) in values {
        hash_str(hasher, name);
        hash_value(hasher, value);
    }
}

// One tag byte per variant keeps `Text("1")` and `Integer(1)` apart.
fn hash_value(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Text(s) => {
            hasher.update([0u8]);
            hash_str(hasher, s);
        }
        Value::Number(n) => {
            hasher.update([1u8]);
            hasher.update(n.to_bits().to_le_bytes());
        }
        Value::Integer(i) => {
            hasher.update([2u8]);
            hasher.update(i.to_le_bytes());
        }
        Value::Bool(b) => hasher.update([3, u8::from(*b)]),
        Value::Timestamp(ts) => {
            hasher.update([4u8]);
            hasher.update(ts.0.timestamp_micros().to_le_bytes());
        }
        Value::List(items) => {
            hasher.update([5u8]);
            hasher.update((items.len() as u64).to_le_bytes());
            for item in items {
                hash_value(hasher, item);
            }
        }
        Value::Record(record) => {
            hasher.update([6u8]);
            hash_record(hasher, record);
        }
    }
}

fn hash_record(hasher: &mut Sha256, record: &Record) {
    hash_str(hasher, record.type_name());
    hasher.update(record.key().0.as_bytes());
    hash_map(hasher, record.values());
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_model::Schema;
    use std::sync::Arc;

    fn invoice() -> Record {
        let schema = Schema::builder("Invoice")
            .text("title")
            .number("amount")
            .list("lines")
            .build()
            .unwrap();
        let mut r = Record::new(Arc::new(schema));
        r.set("title", "Invoice 1").unwrap();
        r.set("amount", 120.0).unwrap();
        r
    }

    #[test]
    fn snapshot_capture_and_verify() {
        let r = invoice();
        let snap = Snapshot::capture(&r, "Create", Timestamp::from_millis(1_000));
        assert!(snap.verify());
        assert_eq!(snap.action(), "Create");
        assert_eq!(snap.get("title"), Some(&Value::from("Invoice 1")));
        // unset attributes are not captured
        assert!(snap.get("lines").is_none());
    }

    #[test]
    fn snapshot_corruption_detected() {
        let r = invoice();
        let mut snap = Snapshot::capture(&r, "Create", Timestamp::from_millis(1_000));
        snap.attributes.insert("amount".into(), Value::Number(999.0));
        assert!(!snap.verify());
    }

    #[test]
    fn snapshot_does_not_alias_live_state() {
        let mut r = invoice();
        r.set("lines", vec!["a", "b"]).unwrap();
        let snap = Snapshot::capture(&r, "Create", Timestamp::from_millis(0));
        r.set("lines", vec!["c"]).unwrap();
        assert_eq!(snap.get("lines"), Some(&Value::from(vec!["a", "b"])));
    }

    #[test]
    fn diff_with_self_is_empty() {
        let mut r = invoice();
        r.set("amount", f64::NAN).unwrap();
        let snap = Snapshot::capture(&r, "Create", Timestamp::from_millis(0));
        assert!(diff(&snap, &snap).is_empty());
        assert!(diff(&snap, &snap.clone()).is_empty());
    }

    #[test]
    fn diff_is_symmetric_and_counts_presence() {
        let mut r = invoice();
        let a = Snapshot::capture(&r, "Create", Timestamp::from_millis(0));
        r.set("amount", 150.0).unwrap();
        r.set("lines", vec!["hosting"]).unwrap();
        let b = Snapshot::capture(&r, "Update", Timestamp::from_millis(1));

        let expected: BTreeSet<String> =
            ["amount", "lines"].iter().map(|s| s.to_string()).collect();
        assert_eq!(diff(&a, &b), expected);
        assert_eq!(diff(&b, &a), expected);
        assert_eq!(a.diff(&b), expected);
    }

    #[test]
    fn digest_tracks_content() {
        let mut r = invoice();
        let ts = Timestamp::from_millis(0);
        let a = Snapshot::capture(&r, "Save", ts);
        assert_eq!(a.digest(), Snapshot::capture(&r, "Save", ts).digest());
        assert_ne!(a.digest(), Snapshot::capture(&r, "Other", ts).digest());
        r.set("amount", 121.0).unwrap();
        assert_ne!(a.digest(), Snapshot::capture(&r, "Save", ts).digest());
    }

    #[test]
    fn digest_covers_sub_millisecond_time() {
        let r = invoice();
        let early = Timestamp::parse_iso8601("2024-01-01T00:00:00.000100Z").unwrap();
        let late = Timestamp::parse_iso8601("2024-01-01T00:00:00.000900Z").unwrap();
        assert_eq!(early.millis(), late.millis());
        let a = Snapshot::capture(&r, "Save", early);
        assert_ne!(a.digest(), Snapshot::capture(&r, "Save", late).digest());

        let mut tampered = a.clone();
        tampered.timestamp = late;
        assert!(!tampered.verify());
    }
}
