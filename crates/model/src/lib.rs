//! Entity model: declared schemas, typed attribute values, records and the
//! validation guard.
//!
//! # Invariants
//! - A schema's attribute list is fixed once built; names are unique.
//! - A record only ever holds attributes its schema declares, with values of the
//!   declared kind.
//! - Nothing here discovers attributes at runtime: serializers and histories walk
//!   the schema.

pub mod guard;
pub mod record;
pub mod schema;
pub mod value;

pub use guard::{ValidationError, Violation};
pub use record::{Entity, EntityMut, Record};
pub use schema::{
    Attribute, AttributeKind, CREATED_AT, MODIFIED_AT, Schema, SchemaBuilder, SchemaError,
};
pub use value::Value;
