pub mod delimited;
pub mod markup;
pub mod normalize;
pub mod table;
pub mod worksheet;

pub use normalize::{excel_serial_to_date, normalize_amount, normalize_date};
pub use table::{parse_delimited_text, parse_spreadsheet, parse_spreadsheet_with, ColumnIndex};
pub use worksheet::{MarkupScanExtractor, WorksheetExtractor};
