use quill_export::ExportError;
use quill_history::HistoryError;
use quill_journal::JournalError;
use quill_model::{SchemaError, ValidationError};

/// Every failure a composed entity can report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Journal(#[from] JournalError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
