use std::sync::LazyLock;

use regex::Regex;

use super::cells::RowCells;
use super::sections::Category;
use crate::ListingRecord;

static ANCHOR_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<a[^>]*>([^<]+)</a>").unwrap());
static STRONG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<strong>(.*?)</strong>").unwrap());
static SUMMARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<summary><strong>(.*?)</strong></summary>").unwrap());
static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a\s[^>]*?href="([^"]+)""#).unwrap());
static BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</?br\s*/?>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Placeholder meaning "same company as the row above".
pub const CONTINUATION: &str = "↳";

/// Turn one row's cells into a record.
///
/// `prev_company` is the last company resolved in the current section; it is
/// updated in place when this row names a company of its own. Returns `None`
/// for rows that cannot yield a complete record.
pub fn normalize(
    cells: &RowCells<'_>,
    prev_company: &mut Option<String>,
    category: Category,
) -> Option<ListingRecord> {
    let company = match company(cells.company) {
        Some(name) if name != CONTINUATION && cells.company != CONTINUATION => {
            *prev_company = Some(name.clone());
            name
        }
        _ => prev_company.clone()?,
    };

    let role = strip_tags(cells.role);
    if role.is_empty() {
        return None;
    }
    let link = link(cells.application)?;

    Some(ListingRecord {
        company,
        role,
        location: location(cells.location),
        link,
        posted: strip_tags(cells.age),
        category,
    })
}

/// Anchor text, else bold text, else plain text.
pub fn company(html: &str) -> Option<String> {
    let raw = ANCHOR_TEXT_RE
        .captures(html)
        .or_else(|| STRONG_RE.captures(html))
        .map(|c| strip_tags(&c[1]))
        .unwrap_or_else(|| strip_tags(html));
    (!raw.is_empty()).then_some(raw)
}

/// Multi-location cells collapse to their `<summary>` label.
pub fn location(html: &str) -> String {
    if let Some(caps) = SUMMARY_RE.captures(html) {
        return strip_tags(&caps[1]);
    }
    strip_tags(&BREAK_RE.replace_all(html, ", "))
        .trim_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string()
}

/// `href` of the first anchor in the cell.
pub fn link(html: &str) -> Option<String> {
    HREF_RE
        .captures(html)
        .map(|c| decode_entities(&c[1]))
        .filter(|l| !l.trim().is_empty())
}

pub fn strip_tags(html: &str) -> String {
    let text = TAG_RE.replace_all(html, "");
    let text = decode_entities(&text);
    SPACE_RE.replace_all(text.trim(), " ").into_owned()
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
