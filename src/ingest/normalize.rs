//! Cell value normalization shared by both input formats.

use chrono::{NaiveDate, TimeDelta};

use crate::models::{CellValue, UNKNOWN_DATE};

/// Numbers strictly inside this window in the date column are read as
/// spreadsheet date serials (roughly 2009 to 2064). This is a range
/// heuristic, not type detection: worksheet cells do not reliably say
/// whether a number is a date, and PnL-sized numbers fall outside it.
pub const DATE_SERIAL_MIN: f64 = 40_000.0;
pub const DATE_SERIAL_MAX: f64 = 60_000.0;

const MS_PER_DAY: f64 = 86_400_000.0;

pub fn is_plausible_date_serial(n: f64) -> bool {
    n > DATE_SERIAL_MIN && n < DATE_SERIAL_MAX
}

/// Signed amount of a PnL cell. Anything unreadable is 0.
pub fn normalize_amount(raw: &CellValue) -> f64 {
    match raw {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => parse_amount(s),
        CellValue::Empty | CellValue::Date(_) => 0.0,
    }
}

/// Parse `$1,160.00`, `$(25.00)`, `-3.5` style amounts.
pub fn parse_amount(s: &str) -> f64 {
    let cleaned: String = s
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.len() >= 2 && cleaned.starts_with('(') && cleaned.ends_with(')') {
        return match parse_float_prefix(&cleaned[1..cleaned.len() - 1]) {
            Some(v) => -v,
            None => 0.0,
        };
    }
    parse_float_prefix(&cleaned).unwrap_or(0.0)
}

/// Longest leading decimal number of `s`, if any (`"12.5USD"` gives 12.5).
fn parse_float_prefix(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// `MM/DD/YYYY` label for a date cell, or [`UNKNOWN_DATE`].
///
/// Text keeps its first whitespace-separated token, which drops a trailing
/// time of day.
pub fn normalize_date(raw: &CellValue) -> String {
    if raw.is_blank() {
        return UNKNOWN_DATE.to_string();
    }
    match raw {
        CellValue::Date(d) => d.format("%m/%d/%Y").to_string(),
        other => other
            .to_string()
            .split_whitespace()
            .next()
            .map_or_else(|| UNKNOWN_DATE.to_string(), str::to_string),
    }
}

/// Calendar date of a spreadsheet date serial, counted in days from
/// 1899-12-30 UTC. Using that anchor keeps the 1900 leap-year quirk of the
/// format intact for every serial after February 1900. Fractional days are
/// a time of day and truncate toward the date they fall on.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = TimeDelta::try_milliseconds((serial * MS_PER_DAY) as i64)?;
    epoch.checked_add_signed(millis).map(|dt| dt.date())
}
