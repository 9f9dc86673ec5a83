use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

pub const TABLE_START: &str =
    "<!-- Please leave a one line gap between this and the table TABLE_START (DO NOT CHANGE THIS LINE) -->";
pub const TABLE_END: &str =
    "<!-- Please leave a one line gap between this and the table TABLE_END (DO NOT CHANGE THIS LINE) -->";

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^##\s*(.*)$").unwrap());
static ROLES_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Internship Roles\s*$").unwrap());

/// One contiguous `<tr> … </tr>` span, lines kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowBlock(pub String);

impl RowBlock {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Cleaned section heading text (markup, suffix and emoji removed).
    Heading(String),
    Row(RowBlock),
}

/// Splits the table region of a README into headings and row blocks.
///
/// Implementations only decide *where* rows and headings are; cell extraction,
/// normalization and classification never depend on which tokenizer ran.
pub trait RowTokenizer {
    fn tokenize(&self, region: &str) -> Vec<Token>;
}

/// Line scanner: `## ` lines are headings, `<tr>` opens a row that runs until
/// the first line containing `</tr>`. Everything else is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineTokenizer;

impl RowTokenizer for LineTokenizer {
    fn tokenize(&self, region: &str) -> Vec<Token> {
        let lines: Vec<&str> = region.lines().collect();
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];

            // ── Section heading: ## 💻 Software Engineering Internship Roles ──
            if line.starts_with("## ") {
                if let Some(caps) = HEADING_RE.captures(line) {
                    tokens.push(Token::Heading(clean_heading(&caps[1])));
                }
                i += 1;
                continue;
            }

            // ── Row element, possibly multi-line ──
            if line.trim_start().starts_with("<tr>") {
                match consume_row(&lines, i) {
                    Some((block, next)) => {
                        tokens.push(Token::Row(block));
                        i = next;
                    }
                    None => {
                        debug!(line = i, "unterminated <tr>, dropping remainder");
                        break;
                    }
                }
                continue;
            }

            i += 1;
        }

        tokens
    }
}

/// Text strictly between the first start sentinel and the first end sentinel
/// after it. `None` when either is missing.
pub fn table_region(doc: &str) -> Option<&str> {
    let after_start = doc.split_once(TABLE_START)?.1;
    let (region, _) = after_start.split_once(TABLE_END)?;
    Some(region)
}

/// Collect lines from `start` until one contains `</tr>`.
/// Returns the block and the index of the line after it.
fn consume_row(lines: &[&str], start: usize) -> Option<(RowBlock, usize)> {
    let mut buf = String::new();
    for (j, line) in lines.iter().enumerate().skip(start) {
        buf.push_str(line);
        buf.push('\n');
        if line.contains("</tr>") {
            return Some((RowBlock(buf), j + 1));
        }
    }
    None
}

fn clean_heading(raw: &str) -> String {
    let without_suffix = ROLES_SUFFIX_RE.replace(raw.trim(), "");
    without_suffix
        .chars()
        .filter(|c| (' '..='~').contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}
