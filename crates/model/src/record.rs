use crate::schema::{Schema, SchemaError};
use crate::value::Value;
use quill_common::EntityKey;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Read access to an entity through its declared schema.
///
/// Serializers, histories and the validation guard consume only this contract.
pub trait Entity {
    fn schema(&self) -> &Schema;

    fn key(&self) -> EntityKey;

    /// Current value of a declared attribute, `None` when unset or undeclared.
    fn value_of(&self, name: &str) -> Option<&Value>;

    fn type_name(&self) -> &str {
        self.schema().type_name()
    }
}

/// Write access used by restore and by composed entities.
pub trait EntityMut: Entity {
    /// Store `value` under `name`, returning the previous value.
    fn assign(&mut self, name: &str, value: Value) -> Result<Option<Value>, SchemaError>;
}

/// The live attribute state of one entity instance.
///
/// Values are stored keyed by name; the schema supplies the order. Every write
/// is checked against the schema, so a record never holds an undeclared
/// attribute or a value of the wrong kind.
#[derive(Debug, Clone)]
pub struct Record {
    key: EntityKey,
    schema: Arc<Schema>,
    values: BTreeMap<String, Value>,
}

impl Record {
    /// Create an empty record with a fresh key.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self::with_key(schema, EntityKey::new())
    }

    /// Create an empty record with a specific key (used when decoding).
    pub fn with_key(schema: Arc<Schema>, key: EntityKey) -> Self {
        Self {
            key,
            schema,
            values: BTreeMap::new(),
        }
    }

    /// Builder-style `set` for constructing nested records.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self, SchemaError> {
        self.set(name, value)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Set a declared attribute. Returns the previous value.
    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, SchemaError> {
        let value = value.into();
        self.schema.check(name, &value)?;
        Ok(self.values.insert(name.to_string(), value))
    }

    /// Attributes in schema order, with `None` for declared-but-unset ones.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.schema
            .attribute_names()
            .map(|name| (name, self.values.get(name)))
    }

    /// Raw storage, keyed by name.
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Number of attributes currently set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// Schemas are compared by type name: two records of the same declared type
// with the same key and values are equal.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.schema.type_name() == other.schema.type_name()
            && self.values == other.values
    }
}

impl Entity for Record {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn key(&self) -> EntityKey {
        self.key
    }

    fn value_of(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl EntityMut for Record {
    fn assign(&mut self, name: &str, value: Value) -> Result<Option<Value>, SchemaError> {
        self.set(name, value)
    }
}
