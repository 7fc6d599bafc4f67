use thiserror::Error;

use crate::constants::REQUIRED_COLUMNS;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// At least one required column is absent from the uploaded file.
    #[error("CSV file is missing one or more required columns. Mandatory columns are {}", REQUIRED_COLUMNS.join(", "))]
    Schema,

    #[error("The file is empty or cannot be read.")]
    EmptyFile,

    #[error("Error parsing the CSV file.")]
    Malformed,

    /// Upload precheck failures: missing file, size cap, wrong extension.
    #[error("{0}")]
    InvalidUpload(String),

    /// `field` is already in human-readable form ("Review count", not
    /// "review_count").
    #[error("{field} cannot be negative.")]
    NegativeField { field: String },

    /// A row could not be persisted. `line` is 1-based in the source file,
    /// counting the header.
    #[error("Row {line} could not be persisted: {cause}")]
    Ingestion { line: usize, cause: String },

    #[error("No products available for generating the summary.")]
    NoData,

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// True for errors caused by the caller's input rather than this service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::Schema
                | PipelineError::EmptyFile
                | PipelineError::Malformed
                | PipelineError::InvalidUpload(_)
                | PipelineError::NegativeField { .. }
                | PipelineError::Ingestion { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
