use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{error, info};

use crate::config::Thresholds;
use crate::error::ReportError;
use crate::ingest::{parse_delimited_text, parse_spreadsheet};
use crate::report::EdgeReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Csv,
    Xlsx,
    Xls,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Csv => write!(f, "csv"),
            FileKind::Xlsx => write!(f, "xlsx"),
            FileKind::Xls => write!(f, "xls"),
        }
    }
}

impl FileKind {
    pub fn from_extension(ext: &str) -> Result<Self, ReportError> {
        match ext.to_lowercase().as_str() {
            "csv" => Ok(FileKind::Csv),
            "xlsx" => Ok(FileKind::Xlsx),
            "xls" => Ok(FileKind::Xls),
            _ => Err(ReportError::UnsupportedFormat(ext.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ReportError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(ext)
    }

    /// Both spreadsheet extensions are read as a ZIP archive; a legacy
    /// binary workbook fails as an unreadable archive.
    pub fn is_spreadsheet(&self) -> bool {
        matches!(self, FileKind::Xlsx | FileKind::Xls)
    }
}

/// Run the whole pipeline on one file buffer. All or nothing: no partial
/// report is returned on failure.
pub async fn analyze(
    bytes: &[u8],
    kind: FileKind,
    thresholds: &Thresholds,
) -> Result<EdgeReport, ReportError> {
    let trades = if kind.is_spreadsheet() {
        parse_spreadsheet(bytes).await.map_err(|e| {
            error!("Spreadsheet parse failed: {}", e);
            ReportError::from(e)
        })?
    } else {
        parse_delimited_text(&String::from_utf8_lossy(bytes))
    };

    if trades.is_empty() {
        return Err(ReportError::EmptyResult);
    }
    info!("Read {} trades from {} input", trades.len(), kind);

    Ok(EdgeReport::build(kind, trades, thresholds))
}

pub async fn analyze_file(
    bytes: &[u8],
    extension: &str,
    thresholds: &Thresholds,
) -> Result<EdgeReport, ReportError> {
    let kind = FileKind::from_extension(extension)?;
    analyze(bytes, kind, thresholds).await
}
