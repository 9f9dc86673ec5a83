use std::sync::LazyLock;

use regex::Regex;

use super::rows::RowBlock;

static CELL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<td>(.*?)</td>").unwrap());

/// Marker the upstream table puts in the application cell of closed postings.
pub const CLOSED_MARKER: &str = "🔒";

/// The five semantic cells of one table row, markup untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCells<'a> {
    pub company: &'a str,
    pub role: &'a str,
    pub location: &'a str,
    pub application: &'a str,
    pub age: &'a str,
}

/// All `<td>` contents of a row, in document order, trimmed.
pub fn cells(row: &RowBlock) -> Vec<&str> {
    CELL_RE
        .captures_iter(row.as_str())
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .collect()
}

/// `None` for rows with fewer than five cells or a closed application.
pub fn extract(row: &RowBlock) -> Option<RowCells<'_>> {
    let all = cells(row);
    let [company, role, location, application, age, ..] = all[..] else {
        return None;
    };
    if application.contains(CLOSED_MARKER) {
        return None;
    }
    Some(RowCells {
        company,
        role,
        location,
        application,
        age,
    })
}
