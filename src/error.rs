use thiserror::Error;

use crate::archive::ArchiveError;

/// Failures at the pipeline boundary. Each maps to one fixed user-facing
/// message; the underlying cause is only for logs.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unsupported file type {0:?}")]
    UnsupportedFormat(String),
    #[error("spreadsheet could not be read: {0}")]
    Archive(#[from] ArchiveError),
    #[error("no valid trades found")]
    EmptyResult,
}

impl ReportError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ReportError::UnsupportedFormat(_) => {
                "Unsupported file type. Please upload a .csv, .xlsx, or .xls file."
            }
            ReportError::Archive(_) => {
                "Could not parse this Excel file. Make sure it's a valid trade export."
            }
            ReportError::EmptyResult => {
                "No valid trades found. Check that this is a CSV or Excel trade export."
            }
        }
    }
}
