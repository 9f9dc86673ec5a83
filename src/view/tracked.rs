use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::ListingRecord;

/// An application the user already tracks; only its identity matters here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedItem {
    pub company: String,
    pub role: String,
}

impl TrackedItem {
    pub fn new(company: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            role: role.into(),
        }
    }

    pub fn key(&self) -> TrackedKey {
        TrackedKey::new(&self.company, &self.role)
    }
}

/// Case-insensitive, whitespace-trimmed `(company, role)` identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackedKey {
    company: String,
    role: String,
}

impl TrackedKey {
    pub fn new(company: &str, role: &str) -> Self {
        Self {
            company: company.trim().to_lowercase(),
            role: role.trim().to_lowercase(),
        }
    }

    pub fn of(record: &ListingRecord) -> Self {
        Self::new(&record.company, &record.role)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrackedSet {
    keys: HashSet<TrackedKey>,
}

impl TrackedSet {
    pub fn new<'a>(items: impl IntoIterator<Item = &'a TrackedItem>) -> Self {
        Self {
            keys: items.into_iter().map(TrackedItem::key).collect(),
        }
    }

    pub fn insert(&mut self, item: &TrackedItem) -> bool {
        self.keys.insert(item.key())
    }

    pub fn contains(&self, record: &ListingRecord) -> bool {
        self.keys.contains(&TrackedKey::of(record))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Category;

    fn record(company: &str, role: &str) -> ListingRecord {
        ListingRecord {
            company: company.into(),
            role: role.into(),
            location: String::new(),
            link: "https://x".into(),
            posted: "1d".into(),
            category: Category::SoftwareEngineering,
        }
    }

    #[test]
    fn identity_ignores_case_and_padding() {
        let set = TrackedSet::new(&[TrackedItem::new("Acme", "SWE Intern")]);
        assert!(set.contains(&record("acme", "SWE Intern ")));
        assert!(set.contains(&record("  ACME", "swe intern")));
    }

    #[test]
    fn identity_needs_both_fields() {
        let set = TrackedSet::new(&[TrackedItem::new("Acme", "SWE Intern")]);
        assert!(!set.contains(&record("Acme", "PM Intern")));
        assert!(!set.contains(&record("Acme Corp", "SWE Intern")));
    }

    #[test]
    fn insert_dedups() {
        let mut set = TrackedSet::default();
        assert!(set.insert(&TrackedItem::new("Acme", "Intern")));
        assert!(!set.insert(&TrackedItem::new("ACME ", "intern")));
        assert_eq!(set.len(), 1);
    }
}
