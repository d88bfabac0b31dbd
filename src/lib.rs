pub mod analysis;
pub mod archive;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod pipeline;
pub mod report;
#[cfg(test)]
pub mod test_helpers;

pub use error::ReportError;
pub use pipeline::{analyze, analyze_file, FileKind};
pub use report::EdgeReport;
