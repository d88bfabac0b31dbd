pub mod cell;
pub mod trade;

pub use cell::CellValue;
pub use trade::{Outcome, Trade, UNKNOWN_DATE};
