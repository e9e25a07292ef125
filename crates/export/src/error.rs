use quill_model::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unsupported export format `{0}`")]
    UnsupportedFormat(String),

    /// The attribute cannot be flattened into a single tabular cell.
    #[error("`{type_name}.{attribute}` is a {kind} attribute and has no tabular form")]
    Shape {
        type_name: String,
        attribute: String,
        kind: &'static str,
    },

    #[error("cannot decode document: {0}")]
    Decode(String),

    #[error("decoded value rejected: {0}")]
    Schema(#[from] SchemaError),

    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
}
