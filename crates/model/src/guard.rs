//! Validation guard: precondition checks run before any state change commits.
//!
//! The guard only reads. A failing check leaves the entity exactly as it was.

use crate::record::Entity;
use std::fmt;

/// Why a required attribute was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The attribute is not set.
    Missing,
    /// The attribute holds a non-text value.
    NotText,
    /// The attribute is empty or whitespace-only.
    Blank,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Missing => "missing",
            Self::NotText => "not text",
            Self::Blank => "blank",
        })
    }
}

/// A required attribute failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed for `{attribute}`: {violation}")]
pub struct ValidationError {
    pub attribute: String,
    pub violation: Violation,
}

impl ValidationError {
    fn new(attribute: &str, violation: Violation) -> Self {
        Self {
            attribute: attribute.to_string(),
            violation,
        }
    }
}

/// Fail unless `name` holds text that is non-empty after trimming.
pub fn require_non_blank<E: Entity + ?Sized>(
    entity: &E,
    name: &str,
) -> Result<(), ValidationError> {
    let value = entity
        .value_of(name)
        .ok_or_else(|| ValidationError::new(name, Violation::Missing))?;
    let text = value
        .as_text()
        .ok_or_else(|| ValidationError::new(name, Violation::NotText))?;
    require_non_blank_str(name, text)
}

/// Check a candidate value before it is written, e.g. a new title for a rename.
pub fn require_non_blank_str(name: &str, candidate: &str) -> Result<(), ValidationError> {
    if candidate.trim().is_empty() {
        return Err(ValidationError::new(name, Violation::Blank));
    }
    Ok(())
}

/// Apply [`require_non_blank`] to every attribute the schema marks required, in
/// schema order. The first failure wins.
pub fn check_required<E: Entity + ?Sized>(entity: &E) -> Result<(), ValidationError> {
    for name in entity.schema().required() {
        if let Err(e) = require_non_blank(entity, name) {
            tracing::debug!(
                entity = entity.type_name(),
                attribute = %e.attribute,
                violation = %e.violation,
                "validation rejected"
            );
            return Err(e);
        }
    }
    Ok(())
}
