use async_trait::async_trait;
use tracing::debug;

use crate::archive::{Archive, ArchiveError};
use crate::ingest::markup::{self, Element};
use crate::models::CellValue;

/// Turns a spreadsheet archive into rows of raw cells.
///
/// Row `0` is the header row. Cells are positional by appearance; columns
/// skipped in the source are not padded back in.
#[async_trait]
pub trait WorksheetExtractor: Send + Sync {
    async fn extract(&self, archive: &Archive) -> Result<Vec<Vec<CellValue>>, ArchiveError>;
}

/// Reads the shared-string table and the first `sheet1.xml` worksheet by
/// tag scanning.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupScanExtractor;

#[async_trait]
impl WorksheetExtractor for MarkupScanExtractor {
    async fn extract(&self, archive: &Archive) -> Result<Vec<Vec<CellValue>>, ArchiveError> {
        let shared = match archive.find(|name| name.to_lowercase().contains("sharedstrings")) {
            Some(entry) => {
                let bytes = entry.decompress().await?;
                parse_shared_strings(&String::from_utf8_lossy(&bytes))
            }
            None => Vec::new(),
        };

        let sheet = archive
            .find(|name| name.to_lowercase().ends_with("sheet1.xml"))
            .ok_or(ArchiveError::MissingWorksheet)?;
        let bytes = sheet.decompress().await?;
        let rows = parse_rows(&String::from_utf8_lossy(&bytes), &shared);

        debug!(
            "{}: {} rows, {} shared strings",
            sheet.name,
            rows.len(),
            shared.len()
        );
        Ok(rows)
    }
}

/// One string per `<si>`, joining all of its `<t>` runs.
pub fn parse_shared_strings(xml: &str) -> Vec<String> {
    markup::elements(xml, "si")
        .map(|si| markup::text_of(si.body, "t"))
        .collect()
}

pub fn parse_rows(xml: &str, shared: &[String]) -> Vec<Vec<CellValue>> {
    markup::elements(xml, "row")
        .map(|row| {
            markup::elements(row.body, "c")
                .map(|cell| parse_cell(cell, shared))
                .collect()
        })
        .collect()
}

fn parse_cell(cell: Element<'_>, shared: &[String]) -> CellValue {
    let raw = markup::elements(cell.body, "v")
        .next()
        .map_or("", |v| v.body);

    match cell.attr("t") {
        Some("s") => raw
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|i| shared.get(i))
            .map_or(CellValue::Empty, |s| CellValue::text(s.as_str())),
        Some("inlineStr") => CellValue::text(markup::text_of(cell.body, "t")),
        _ if raw.is_empty() => CellValue::Empty,
        _ => match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::text(markup::unescape(raw)),
        },
    }
}
