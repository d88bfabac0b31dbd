use crate::models::CellValue;

pub const DELIMITER: char = ',';

pub fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
}

/// Split one line into fields. A double quote toggles quoted mode, in which
/// the delimiter is literal; the quote itself is dropped.
pub fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            DELIMITER if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

pub fn rows(text: &str) -> Vec<Vec<CellValue>> {
    lines(text)
        .map(|line| split_row(line).into_iter().map(CellValue::text).collect())
        .collect()
}
