pub mod cells;
pub mod normalize;
pub mod rows;
pub mod sections;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use rows::{LineTokenizer, RowBlock, RowTokenizer};
use sections::{Category, Section};

/// One open internship posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub company: String,
    pub role: String,
    pub location: String,
    pub link: String,
    /// Free-form age as written upstream, e.g. "5d" or "1mo".
    pub posted: String,
    pub category: Category,
}

/// Fold accumulator for the assembler.
///
/// Holding it as a value lets a caller feed sections one at a time and
/// inspect or replay the state between them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblerState {
    pub category: Category,
    pub prev_company: Option<String>,
}

impl AssemblerState {
    /// Enter a new section: adopt its category and forget the previous company.
    pub fn enter(&mut self, section: &Section) {
        self.category = section.category;
        self.prev_company = None;
    }

    /// Process one row under the current state.
    pub fn step(&mut self, row: &RowBlock) -> Option<ListingRecord> {
        let Some(row_cells) = cells::extract(row) else {
            trace!("row skipped: short or closed");
            return None;
        };
        let record = normalize::normalize(&row_cells, &mut self.prev_company, self.category);
        if record.is_none() {
            trace!(company = row_cells.company, "row skipped: incomplete record");
        }
        record
    }
}

/// Document-ordered, single-pass stream of records.
pub struct Listings {
    sections: std::vec::IntoIter<Section>,
    rows: std::vec::IntoIter<RowBlock>,
    state: AssemblerState,
}

impl Listings {
    pub fn new(doc: &str) -> Self {
        Self::with_tokenizer(doc, &LineTokenizer)
    }

    pub fn with_tokenizer(doc: &str, tokenizer: &dyn RowTokenizer) -> Self {
        let sections = match rows::table_region(doc) {
            Some(region) => sections::cluster_sections(tokenizer.tokenize(region)),
            None => {
                debug!("table sentinels not found, no listings");
                Vec::new()
            }
        };
        Self::from_sections(sections)
    }

    pub fn from_sections(sections: Vec<Section>) -> Self {
        Self {
            sections: sections.into_iter(),
            rows: Vec::new().into_iter(),
            state: AssemblerState::default(),
        }
    }

    pub fn state(&self) -> &AssemblerState {
        &self.state
    }
}

impl Iterator for Listings {
    type Item = ListingRecord;

    fn next(&mut self) -> Option<ListingRecord> {
        loop {
            for row in self.rows.by_ref() {
                if let Some(record) = self.state.step(&row) {
                    return Some(record);
                }
            }
            let section = self.sections.next()?;
            self.state.enter(&section);
            self.rows = section.rows.into_iter();
        }
    }
}

/// Parse a README into listings with the default line tokenizer.
pub fn parse_listings(doc: &str) -> Vec<ListingRecord> {
    parse_listings_with(doc, &LineTokenizer)
}

pub fn parse_listings_with(doc: &str, tokenizer: &dyn RowTokenizer) -> Vec<ListingRecord> {
    let listings: Vec<ListingRecord> = Listings::with_tokenizer(doc, tokenizer).collect();
    debug!(count = listings.len(), "parsed listings");
    listings
}

// ── Tests ──
