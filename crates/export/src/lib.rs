//! Serializer: JSON, CSV and XML renditions of an entity.
//!
//! Every function here is a pure function of the entity's declared state, its
//! schema and, optionally, its history series.
//!
//! # Invariants
//! - Output order follows the schema, never storage order.
//! - Identical state gives byte-identical output.
//! - JSON and XML coercion never fails; only CSV can reject a shape.

mod error;
pub mod json;
pub mod tabular;
pub mod xml;

pub use error::ExportError;
pub use json::{from_json, to_json};
pub use tabular::{Tabular, flat_record, to_csv};
pub use xml::to_xml;

use quill_history::HistorySeries;
use std::fmt;
use std::str::FromStr;

/// Entity export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
    Xml,
}

impl FromStr for Format {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "xml" => Ok(Self::Xml),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Xml => "xml",
        })
    }
}

/// Render `entity` in `format`. CSV ignores the history.
pub fn render<E: Tabular + ?Sized>(
    entity: &E,
    format: Format,
    history: Option<&HistorySeries>,
) -> Result<String, ExportError> {
    tracing::debug!(entity = entity.type_name(), %format, "render");
    match format {
        Format::Json => Ok(to_json(entity, history)),
        Format::Csv => to_csv(entity),
        Format::Xml => Ok(to_xml(entity, history)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_model::{Record, Schema};
    use std::sync::Arc;

    #[test]
    fn format_parsing() {
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("CSV".parse::<Format>().unwrap(), Format::Csv);
        assert_eq!("Xml".parse::<Format>().unwrap(), Format::Xml);
        let err = "yaml".parse::<Format>().unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedFormat(ref f) if f == "yaml"));
    }

    #[test]
    fn render_dispatches() {
        let schema = Schema::builder("Note").text("body").build().unwrap();
        let record = Record::new(Arc::new(schema)).with("body", "hi").unwrap();

        assert_eq!(render(&record, Format::Csv, None).unwrap(), "body\nhi\n");
        assert_eq!(
            render(&record, Format::Xml, None).unwrap(),
            "<Note><body>hi</body></Note>"
        );
        assert!(
            render(&record, Format::Json, None)
                .unwrap()
                .contains("\"_class\": \"Note\"")
        );
    }
}
