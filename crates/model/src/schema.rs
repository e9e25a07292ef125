use crate::record::Entity;
use crate::value::Value;
use std::sync::Arc;

/// Attribute maintained by composition when a schema declares [`SchemaBuilder::timestamps`].
pub const CREATED_AT: &str = "created_at";
/// Touched on every committed update of a timestamped entity.
pub const MODIFIED_AT: &str = "modified_at";

/// Errors raised while declaring a schema or writing attributes against it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid name `{0}`")]
    InvalidName(String),
    #[error("{0} declares no attributes")]
    NoAttributes(String),
    #[error("attribute name `{0}` is reserved (leading underscore)")]
    ReservedName(String),
    #[error("attribute `{attribute}` is declared twice in {type_name}")]
    DuplicateAttribute { type_name: String, attribute: String },
    #[error("{type_name} does not declare attribute `{attribute}`")]
    UndeclaredAttribute { type_name: String, attribute: String },
    #[error("required attribute `{attribute}` of {type_name} must be text")]
    RequiredNotText { type_name: String, attribute: String },
    #[error("attribute `{attribute}` of {type_name} expects {expected}, got {found}")]
    KindMismatch {
        type_name: String,
        attribute: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// The declared type of an attribute.
#[derive(Debug, Clone)]
pub enum AttributeKind {
    Text,
    Number,
    Integer,
    Bool,
    Timestamp,
    /// Ordered sequence of primitive values.
    List,
    /// A nested entity of the given schema, owned by the parent.
    Entity(Arc<Schema>),
}

impl AttributeKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Bool => "bool",
            Self::Timestamp => "timestamp",
            Self::List => "list",
            Self::Entity(_) => "entity",
        }
    }

    /// Flat kinds fit a single CSV cell without flattening.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::List | Self::Entity(_))
    }

    /// Whether `value` may be stored under this kind.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Text, Value::Text(_))
            | (Self::Number, Value::Number(_))
            | (Self::Integer, Value::Integer(_))
            | (Self::Bool, Value::Bool(_))
            | (Self::Timestamp, Value::Timestamp(_)) => true,
            (Self::List, Value::List(items)) => items.iter().all(Value::is_primitive),
            (Self::Entity(schema), Value::Record(record)) => {
                record.type_name() == schema.type_name()
            }
            _ => false,
        }
    }
}

/// One declared attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeKind,
}

/// Declares, per entity type, the ordered list of attributes eligible for
/// serialization and versioning.
///
/// Built once through [`Schema::builder`] and shared behind an `Arc`; the
/// attribute list never changes afterwards.
#[derive(Debug, Clone)]
pub struct Schema {
    type_name: String,
    attributes: Vec<Attribute>,
    required: Vec<String>,
    primary: Option<String>,
}

impl Schema {
    pub fn builder(type_name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            type_name: type_name.into(),
            attributes: Vec::new(),
            required: Vec::new(),
            primary: None,
        }
    }

    /// Declared entity type name (`_class` in JSON, root element in XML).
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Attribute names in declaration order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Attributes that must hold non-blank text before any state change commits.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// The attribute reported by "latest value" accessors on histories.
    pub fn primary(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    /// Whether both creation and modification timestamps are declared.
    pub fn is_timestamped(&self) -> bool {
        [CREATED_AT, MODIFIED_AT].iter().all(|name| {
            matches!(
                self.attribute(name).map(|a| &a.kind),
                Some(AttributeKind::Timestamp)
            )
        })
    }

    /// Check `value` against the declaration of `name`.
    pub fn check(&self, name: &str, value: &Value) -> Result<(), SchemaError> {
        let attr = self
            .attribute(name)
            .ok_or_else(|| SchemaError::UndeclaredAttribute {
                type_name: self.type_name.clone(),
                attribute: name.to_string(),
            })?;
        if attr.kind.accepts(value) {
            Ok(())
        } else {
            Err(SchemaError::KindMismatch {
                type_name: self.type_name.clone(),
                attribute: name.to_string(),
                expected: attr.kind.label(),
                found: value.kind_label(),
            })
        }
    }
}

/// Incremental schema declaration. Errors surface at [`SchemaBuilder::build`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    type_name: String,
    attributes: Vec<Attribute>,
    required: Vec<String>,
    primary: Option<String>,
}

impl SchemaBuilder {
    pub fn attribute(mut self, name: impl Into<String>, kind: AttributeKind) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn text(self, name: impl Into<String>) -> Self {
        self.attribute(name, AttributeKind::Text)
    }

    pub fn number(self, name: impl Into<String>) -> Self {
        self.attribute(name, AttributeKind::Number)
    }

    pub fn integer(self, name: impl Into<String>) -> Self {
        self.attribute(name, AttributeKind::Integer)
    }

    pub fn bool(self, name: impl Into<String>) -> Self {
        self.attribute(name, AttributeKind::Bool)
    }

    pub fn timestamp(self, name: impl Into<String>) -> Self {
        self.attribute(name, AttributeKind::Timestamp)
    }

    pub fn list(self, name: impl Into<String>) -> Self {
        self.attribute(name, AttributeKind::List)
    }

    pub fn entity(self, name: impl Into<String>, schema: Arc<Schema>) -> Self {
        self.attribute(name, AttributeKind::Entity(schema))
    }

    /// Declare `created_at` and `modified_at`.
    pub fn timestamps(self) -> Self {
        self.timestamp(CREATED_AT).timestamp(MODIFIED_AT)
    }

    /// Mark an already-declared (or later-declared) text attribute as required.
    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    pub fn primary(mut self, name: impl Into<String>) -> Self {
        self.primary = Some(name.into());
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        if !is_valid_name(&self.type_name) {
            return Err(SchemaError::InvalidName(self.type_name));
        }
        if self.attributes.is_empty() {
            return Err(SchemaError::NoAttributes(self.type_name));
        }
        for (i, attr) in self.attributes.iter().enumerate() {
            if attr.name.starts_with('_') {
                return Err(SchemaError::ReservedName(attr.name.clone()));
            }
            if !is_valid_name(&attr.name) {
                return Err(SchemaError::InvalidName(attr.name.clone()));
            }
            if self.attributes[..i].iter().any(|a| a.name == attr.name) {
                return Err(SchemaError::DuplicateAttribute {
                    type_name: self.type_name.clone(),
                    attribute: attr.name.clone(),
                });
            }
        }

        let undeclared = |name: &String| SchemaError::UndeclaredAttribute {
            type_name: self.type_name.clone(),
            attribute: name.clone(),
        };
        for name in &self.required {
            let attr = self
                .attributes
                .iter()
                .find(|a| &a.name == name)
                .ok_or_else(|| undeclared(name))?;
            if !matches!(attr.kind, AttributeKind::Text) {
                return Err(SchemaError::RequiredNotText {
                    type_name: self.type_name.clone(),
                    attribute: name.clone(),
                });
            }
        }
        if let Some(primary) = &self.primary {
            if !self.attributes.iter().any(|a| &a.name == primary) {
                return Err(undeclared(primary));
            }
        }

        let mut required = self.required;
        required.dedup();
        Ok(Schema {
            type_name: self.type_name,
            attributes: self.attributes,
            required,
            primary: self.primary,
        })
    }
}

/// Names double as XML element names, so they follow the XML name rules
/// (letters, digits, `_`, `-`, `.`; no leading digit, `-` or `.`).
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
