use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rows::{RowBlock, Token};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Category {
    #[default]
    #[serde(rename = "Software Engineering")]
    SoftwareEngineering,
    #[serde(rename = "Product Management")]
    ProductManagement,
    #[serde(rename = "Data Science, AI/ML")]
    DataScience,
    #[serde(rename = "Quantitative Finance")]
    QuantitativeFinance,
    #[serde(rename = "Hardware Engineering")]
    HardwareEngineering,
}

impl Category {
    /// Declaration order doubles as heading match priority.
    pub const ALL: [Category; 5] = [
        Category::SoftwareEngineering,
        Category::ProductManagement,
        Category::DataScience,
        Category::QuantitativeFinance,
        Category::HardwareEngineering,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::SoftwareEngineering => "Software Engineering",
            Category::ProductManagement => "Product Management",
            Category::DataScience => "Data Science, AI/ML",
            Category::QuantitativeFinance => "Quantitative Finance",
            Category::HardwareEngineering => "Hardware Engineering",
        }
    }

    /// Substring looked for in a cleaned section heading.
    fn needle(self) -> &'static str {
        match self {
            // Upstream heads this section "Data Science, AI & Machine Learning".
            Category::DataScience => "Data Science",
            other => other.label(),
        }
    }

    /// First category whose name occurs in `heading`.
    pub fn from_heading(heading: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| heading.contains(c.needle()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts the label or a loose alias ("swe", "pm", "ds", "quant", "hw").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.label().to_lowercase() == lower)
            .or(match lower.as_str() {
                "swe" | "software" => Some(Category::SoftwareEngineering),
                "pm" | "product" => Some(Category::ProductManagement),
                "ds" | "data" | "ml" | "ai" => Some(Category::DataScience),
                "quant" | "finance" => Some(Category::QuantitativeFinance),
                "hw" | "hardware" => Some(Category::HardwareEngineering),
                _ => None,
            })
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// Sticky "current category": only a recognized heading moves it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classifier {
    current: Category,
}

impl Classifier {
    pub fn current(&self) -> Category {
        self.current
    }

    pub fn observe(&mut self, heading: &str) -> Category {
        match Category::from_heading(heading) {
            Some(c) => self.current = c,
            None => debug!(heading, current = %self.current, "unrecognized heading, category kept"),
        }
        self.current
    }
}

#[derive(Debug, Clone)]
pub struct Section {
    pub category: Category,
    pub rows: Vec<RowBlock>,
}

/// Group a token stream into sections, one per heading.
///
/// Rows before the first heading form a leading section under the default
/// category. Every heading opens a new section even when it leaves the
/// category unchanged, so continuation rows never reach across headings.
pub fn cluster_sections(tokens: Vec<Token>) -> Vec<Section> {
    let mut classifier = Classifier::default();
    let mut sections: Vec<Section> = Vec::new();
    let mut current = Section {
        category: classifier.current(),
        rows: Vec::new(),
    };

    for token in tokens {
        match token {
            Token::Heading(text) => {
                let category = classifier.observe(&text);
                let finished = std::mem::replace(
                    &mut current,
                    Section {
                        category,
                        rows: Vec::new(),
                    },
                );
                if !finished.rows.is_empty() {
                    sections.push(finished);
                }
            }
            Token::Row(row) => current.rows.push(row),
        }
    }

    if !current.rows.is_empty() {
        sections.push(current);
    }

    sections
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn row(s: &str) -> Token {
        Token::Row(RowBlock(s.to_string()))
    }

    #[test]
    fn heading_substring_match() {
        assert_eq!(
            Category::from_heading("Quantitative Finance"),
            Some(Category::QuantitativeFinance)
        );
        assert_eq!(
            Category::from_heading("Data Science, AI & Machine Learning"),
            Some(Category::DataScience)
        );
        assert_eq!(Category::from_heading("Other"), None);
    }

    #[test]
    fn first_match_wins() {
        let h = "Software Engineering and Hardware Engineering";
        assert_eq!(Category::from_heading(h), Some(Category::SoftwareEngineering));
    }

    #[test]
    fn unknown_heading_is_sticky() {
        let mut c = Classifier::default();
        c.observe("Product Management");
        assert_eq!(c.observe("Misc Opportunities"), Category::ProductManagement);
    }

    #[test]
    fn sections_split_on_every_heading() {
        let tokens = vec![
            Token::Heading("Hardware Engineering".into()),
            row("a"),
            Token::Heading("Decorative".into()),
            row("b"),
            row("c"),
        ];
        let sections = cluster_sections(tokens);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].category, Category::HardwareEngineering);
        assert_eq!(sections[1].category, Category::HardwareEngineering);
        assert_eq!(sections[1].rows.len(), 2);
    }

    #[test]
    fn rows_before_heading_use_default() {
        let sections = cluster_sections(vec![row("a")]);
        assert_eq!(sections[0].category, Category::SoftwareEngineering);
    }

    #[test]
    fn empty_sections_skipped() {
        let tokens = vec![
            Token::Heading("Software Engineering".into()),
            Token::Heading("Product Management".into()),
            row("a"),
        ];
        let sections = cluster_sections(tokens);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].category, Category::ProductManagement);
    }

    #[test]
    fn parse_category_names() {
        assert_eq!("quant".parse::<Category>(), Ok(Category::QuantitativeFinance));
        assert_eq!("product management".parse::<Category>(), Ok(Category::ProductManagement));
        assert!("cooking".parse::<Category>().is_err());
    }
}
