use tracing::{debug, warn};

use crate::archive::{Archive, ArchiveError};
use crate::ingest::delimited;
use crate::ingest::normalize::{
    excel_serial_to_date, is_plausible_date_serial, normalize_amount, normalize_date,
};
use crate::ingest::worksheet::{MarkupScanExtractor, WorksheetExtractor};
use crate::models::{CellValue, Trade};

pub const SYMBOL_COLUMN: &str = "symbol";
pub const PNL_COLUMN: &str = "pnl";
pub const BOUGHT_TIMESTAMP_COLUMN: &str = "boughtTimestamp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnIndex {
    pub symbol: Option<usize>,
    pub pnl: Option<usize>,
    pub bought_timestamp: Option<usize>,
}

impl ColumnIndex {
    pub fn resolve(headers: &[CellValue]) -> Self {
        let labels: Vec<String> = headers
            .iter()
            .map(|h| trim_label(&h.to_string()).to_string())
            .collect();
        let find = |name: &str| labels.iter().position(|l| l == name);

        Self {
            symbol: find(SYMBOL_COLUMN),
            pnl: find(PNL_COLUMN),
            bought_timestamp: find(BOUGHT_TIMESTAMP_COLUMN),
        }
    }

    /// Rows that do not reach the PnL column are partial exports and get
    /// skipped.
    fn is_short(&self, row: &[CellValue]) -> bool {
        self.pnl.is_some_and(|p| row.len() <= p)
    }
}

pub fn parse_delimited_text(text: &str) -> Vec<Trade> {
    trades_from_rows(&delimited::rows(text))
}

pub async fn parse_spreadsheet(buf: &[u8]) -> Result<Vec<Trade>, ArchiveError> {
    parse_spreadsheet_with(buf, &MarkupScanExtractor).await
}

pub async fn parse_spreadsheet_with(
    buf: &[u8],
    extractor: &dyn WorksheetExtractor,
) -> Result<Vec<Trade>, ArchiveError> {
    let archive = Archive::read(buf)?;
    debug!("Archive has {} entries", archive.len());
    let rows = extractor.extract(&archive).await?;
    Ok(trades_from_rows(&rows))
}

/// Header row plus data rows to trades, in row order. Fewer than two rows
/// yields no trades.
pub fn trades_from_rows(rows: &[Vec<CellValue>]) -> Vec<Trade> {
    let Some((headers, data)) = rows.split_first() else {
        return Vec::new();
    };
    if data.is_empty() {
        return Vec::new();
    }

    let idx = ColumnIndex::resolve(headers);
    for (name, found) in [
        (SYMBOL_COLUMN, idx.symbol),
        (PNL_COLUMN, idx.pnl),
        (BOUGHT_TIMESTAMP_COLUMN, idx.bought_timestamp),
    ] {
        if found.is_none() {
            warn!("Header row has no `{}` column", name);
        }
    }

    let mut trades = Vec::with_capacity(data.len());
    let mut skipped = 0;
    for row in data {
        if idx.is_short(row) {
            skipped += 1;
            continue;
        }
        let cell = |i: Option<usize>| i.and_then(|i| row.get(i));

        let symbol = match cell(idx.symbol) {
            Some(c) if !c.is_blank() => c.to_string().trim().to_string(),
            _ => String::new(),
        };
        let pnl = cell(idx.pnl).map_or(0.0, normalize_amount);
        let date = match cell(idx.bought_timestamp) {
            Some(&CellValue::Number(n)) if is_plausible_date_serial(n) => {
                match excel_serial_to_date(n) {
                    Some(d) => normalize_date(&CellValue::Date(d)),
                    None => normalize_date(&CellValue::Number(n)),
                }
            }
            Some(c) => normalize_date(c),
            None => normalize_date(&CellValue::Empty),
        };

        trades.push(Trade { symbol, pnl, date });
    }

    debug!("Parsed {} trades, skipped {} short rows", trades.len(), skipped);
    trades
}

/// Header labels are compared after trimming whitespace and a leading
/// byte-order mark.
fn trim_label(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNKNOWN_DATE;

    const CSV: &str = "\u{feff}id,symbol, pnl ,boughtTimestamp\n\
        1,MESH6,$10.00,01/26/2026 09:31:02\n\
        2,MESH6,$(15.00),01/26/2026 09:40:11\n\
        3,MNQH6,\"$1,160.00\",01/27/2026 10:02:00\n";

    #[test]
    fn csv_rows_become_trades_in_order() {
        let trades = parse_delimited_text(CSV);
        assert_eq!(
            trades,
            vec![
                Trade::new("MESH6", 10.0, "01/26/2026"),
                Trade::new("MESH6", -15.0, "01/26/2026"),
                Trade::new("MNQH6", 1160.0, "01/27/2026"),
            ]
        );
    }

    #[test]
    fn header_only_is_empty() {
        assert!(parse_delimited_text("symbol,pnl,boughtTimestamp\n").is_empty());
        assert!(parse_delimited_text("").is_empty());
    }

    #[test]
    fn short_rows_are_skipped() {
        let text = "symbol,x,pnl,boughtTimestamp\nMES,1,5,01/02/2026\nMES,1\nMES,1,-3\n";
        let trades = parse_delimited_text(text);
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[1], Trade::new("MES", -3.0, UNKNOWN_DATE));
    }

    #[test]
    fn header_names_are_case_sensitive() {
        let idx = ColumnIndex::resolve(&[
            CellValue::text("Symbol"),
            CellValue::text("pnl"),
            CellValue::text("boughttimestamp"),
        ]);
        assert_eq!(idx.symbol, None);
        assert_eq!(idx.pnl, Some(1));
        assert_eq!(idx.bought_timestamp, None);
    }

    #[test]
    fn missing_pnl_column_reads_zero() {
        let trades = parse_delimited_text("symbol,boughtTimestamp\nMES,01/02/2026\n");
        assert_eq!(trades, vec![Trade::new("MES", 0.0, "01/02/2026")]);
    }

    #[test]
    fn numeric_date_serials_convert_only_in_window() {
        let rows = vec![
            vec![
                CellValue::text("symbol"),
                CellValue::text("pnl"),
                CellValue::text("boughtTimestamp"),
            ],
            vec![
                CellValue::text("MES"),
                CellValue::Number(450.0),
                CellValue::Number(46048.79),
            ],
            vec![
                CellValue::Number(0.0),
                CellValue::Number(-210.0),
                CellValue::Number(39999.0),
            ],
        ];
        let trades = trades_from_rows(&rows);
        assert_eq!(trades[0], Trade::new("MES", 450.0, "01/26/2026"));
        assert_eq!(trades[1], Trade::new("", -210.0, "39999"));
    }

    #[test]
    fn row_count_matches_input() {
        let mut text = String::from("symbol,pnl,boughtTimestamp\n");
        for i in 0..25 {
            text.push_str(&format!("SYM{i},{i}.5,01/{:02}/2026 10:00:00\n", i % 28 + 1));
        }
        let trades = parse_delimited_text(&text);
        assert_eq!(trades.len(), 25);
        assert!(trades
            .iter()
            .enumerate()
            .all(|(i, t)| t.symbol == format!("SYM{i}")));
    }
}
