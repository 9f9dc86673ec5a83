pub mod promote;
pub mod tracked;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::{Category, ListingRecord};
use tracked::{TrackedItem, TrackedSet};

pub const PAGE_SIZE: usize = 100;
/// Remaining scroll distance, in pixels, that counts as "near the bottom".
pub const NEAR_BOTTOM_PX: f64 = 200.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => c == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        s.parse().map(CategoryFilter::Only)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Upstream table order.
    #[default]
    Document,
    CompanyAz,
    CompanyZa,
    RoleAz,
    RoleZa,
}

impl SortOrder {
    fn apply(self, items: &mut [&ListingRecord]) {
        let by_company = |a: &&ListingRecord, b: &&ListingRecord| {
            a.company.to_lowercase().cmp(&b.company.to_lowercase())
        };
        let by_role =
            |a: &&ListingRecord, b: &&ListingRecord| a.role.to_lowercase().cmp(&b.role.to_lowercase());
        match self {
            SortOrder::Document => {}
            SortOrder::CompanyAz => items.sort_by(by_company),
            SortOrder::CompanyZa => items.sort_by(|a, b| by_company(b, a)),
            SortOrder::RoleAz => items.sort_by(by_role),
            SortOrder::RoleZa => items.sort_by(|a, b| by_role(b, a)),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "document" | "default" => Ok(SortOrder::Document),
            "company-az" => Ok(SortOrder::CompanyAz),
            "company-za" => Ok(SortOrder::CompanyZa),
            "role-az" => Ok(SortOrder::RoleAz),
            "role-za" => Ok(SortOrder::RoleZa),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            SortOrder::Document => "document",
            SortOrder::CompanyAz => "company-az",
            SortOrder::CompanyZa => "company-za",
            SortOrder::RoleAz => "role-az",
            SortOrder::RoleZa => "role-za",
        })
    }
}

/// Viewport geometry reported by the scroll container.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl Viewport {
    pub fn near_bottom(&self) -> bool {
        self.scroll_height - self.scroll_top - self.client_height < NEAR_BOTTOM_PX
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub total: usize,
    pub by_category: BTreeMap<Category, usize>,
}

impl CategoryCounts {
    pub fn get(&self, category: Category) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }
}

/// Recommendation feed reconciled against the user's tracked applications.
///
/// Everything visible is derived on demand from four inputs: the raw
/// listings, the tracked set, the query and the category filter. Nothing is
/// cached between calls, so a changed input is reflected immediately.
#[derive(Debug, Clone)]
pub struct FeedView {
    listings: Vec<ListingRecord>,
    tracked: TrackedSet,
    query: String,
    category: CategoryFilter,
    sort: SortOrder,
    display_count: usize,
    scroll_top: f64,
}

impl Default for FeedView {
    fn default() -> Self {
        Self::new(Vec::new(), &[])
    }
}

impl FeedView {
    pub fn new(listings: Vec<ListingRecord>, tracked: &[TrackedItem]) -> Self {
        Self {
            listings,
            tracked: TrackedSet::new(tracked),
            query: String::new(),
            category: CategoryFilter::All,
            sort: SortOrder::Document,
            display_count: PAGE_SIZE,
            scroll_top: 0.0,
        }
    }

    /// Swap in a fresh fetch; the latest call wins.
    pub fn replace_listings(&mut self, listings: Vec<ListingRecord>) {
        debug!(count = listings.len(), "listings replaced");
        self.listings = listings;
    }

    pub fn replace_tracked(&mut self, tracked: &[TrackedItem]) {
        self.tracked = TrackedSet::new(tracked);
    }

    /// Record a newly tracked item; matching listings drop out of the feed.
    pub fn mark_tracked(&mut self, item: &TrackedItem) {
        self.tracked.insert(item);
    }

    /// Whitespace around the query is ignored, so a blank query matches everything.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query != self.query {
            self.query = query;
            self.reset_paging();
        }
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        if category != self.category {
            self.category = category;
            self.reset_paging();
        }
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        if sort != self.sort {
            self.sort = sort;
            self.reset_paging();
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn category(&self) -> CategoryFilter {
        self.category
    }

    /// Upper bound on rows shown. Never below [`PAGE_SIZE`], even when fewer
    /// records match; [`FeedView::visible`] applies the filtered length.
    pub fn display_count(&self) -> usize {
        self.display_count
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    /// Grow the page when the viewport is close to the end. Returns whether it grew.
    pub fn on_scroll(&mut self, viewport: Viewport) -> bool {
        self.scroll_top = viewport.scroll_top;
        if !viewport.near_bottom() {
            return false;
        }
        let limit = self.filtered().len().max(PAGE_SIZE);
        let next = (self.display_count + PAGE_SIZE).min(limit);
        let grew = next > self.display_count;
        self.display_count = next;
        grew
    }

    /// Listings not already tracked, in source order.
    pub fn reconciled(&self) -> Vec<&ListingRecord> {
        self.listings
            .iter()
            .filter(|r| !self.tracked.contains(r))
            .collect()
    }

    /// Reconciled listings after search, category filter and sort.
    pub fn filtered(&self) -> Vec<&ListingRecord> {
        let needle = self.query.trim().to_lowercase();
        let mut items: Vec<&ListingRecord> = self
            .reconciled()
            .into_iter()
            .filter(|r| self.category.matches(r.category))
            .filter(|r| needle.is_empty() || matches_query(r, &needle))
            .collect();
        self.sort.apply(&mut items);
        items
    }

    /// The slice to render: the filtered set capped at the display count.
    pub fn visible(&self) -> Vec<&ListingRecord> {
        let mut items = self.filtered();
        items.truncate(self.display_count);
        items
    }

    pub fn category_counts(&self) -> CategoryCounts {
        let mut counts = CategoryCounts::default();
        for record in self.reconciled() {
            counts.total += 1;
            *counts.by_category.entry(record.category).or_insert(0) += 1;
        }
        counts
    }

    fn reset_paging(&mut self) {
        self.display_count = PAGE_SIZE;
        self.scroll_top = 0.0;
    }
}

fn matches_query(record: &ListingRecord, needle: &str) -> bool {
    [&record.company, &record.role, &record.location]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn record(company: &str, role: &str, location: &str, category: Category) -> ListingRecord {
        ListingRecord {
            company: company.into(),
            role: role.into(),
            location: location.into(),
            link: format!("https://jobs.example/{company}/{role}"),
            posted: "1d".into(),
            category,
        }
    }

    fn sample() -> Vec<ListingRecord> {
        vec![
            record("Stripe", "SWE Intern", "SF", Category::SoftwareEngineering),
            record("Stripe", "Backend Intern", "Seattle", Category::SoftwareEngineering),
            record("Jane Street", "Trader Intern", "NYC", Category::QuantitativeFinance),
            record("Figma", "PM Intern", "NYC", Category::ProductManagement),
        ]
    }

    fn many(n: usize) -> Vec<ListingRecord> {
        (0..n)
            .map(|i| record(&format!("Co{i}"), "Intern", "Remote", Category::SoftwareEngineering))
            .collect()
    }

    fn bottom() -> Viewport {
        Viewport {
            scroll_top: 900.0,
            scroll_height: 1500.0,
            client_height: 500.0,
        }
    }

    #[test]
    fn tracked_items_excluded() {
        let view = FeedView::new(sample(), &[TrackedItem::new("stripe", " SWE Intern")]);
        let roles: Vec<&str> = view.reconciled().iter().map(|r| r.role.as_str()).collect();
        assert_eq!(roles, vec!["Backend Intern", "Trader Intern", "PM Intern"]);
    }

    #[test]
    fn query_matches_company_role_location() {
        let mut view = FeedView::new(sample(), &[]);
        view.set_query("nyc");
        assert_eq!(view.filtered().len(), 2);
        view.set_query("STRIPE");
        assert_eq!(view.filtered().len(), 2);
        view.set_query("trader");
        assert_eq!(view.filtered().len(), 1);
        view.set_query("   ");
        assert_eq!(view.filtered().len(), 4);
    }

    #[test]
    fn category_filter() {
        let mut view = FeedView::new(sample(), &[]);
        view.set_category(CategoryFilter::Only(Category::ProductManagement));
        assert_eq!(view.filtered().len(), 1);
        view.set_category(CategoryFilter::All);
        assert_eq!(view.filtered().len(), 4);
    }

    #[test]
    fn counts_skip_tracked_and_follow_updates() {
        let mut view = FeedView::new(sample(), &[]);
        assert_eq!(view.category_counts().get(Category::SoftwareEngineering), 2);

        view.mark_tracked(&TrackedItem::new("Stripe", "SWE Intern"));
        let counts = view.category_counts();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.get(Category::SoftwareEngineering), 1);
        assert_eq!(counts.get(Category::HardwareEngineering), 0);
    }

    #[test]
    fn counts_ignore_query_and_filter() {
        let mut view = FeedView::new(sample(), &[]);
        view.set_query("figma");
        view.set_category(CategoryFilter::Only(Category::ProductManagement));
        assert_eq!(view.category_counts().total, 4);
    }

    #[test]
    fn visible_is_idempotent() {
        let view = FeedView::new(many(250), &[]);
        assert_eq!(view.visible(), view.visible());
        assert_eq!(view.visible().len(), PAGE_SIZE);
    }

    #[test]
    fn scroll_grows_and_clamps() {
        let mut view = FeedView::new(many(250), &[]);
        assert!(view.on_scroll(bottom()));
        assert_eq!(view.display_count(), 200);
        assert!(view.on_scroll(bottom()));
        assert_eq!(view.display_count(), 250);
        assert!(!view.on_scroll(bottom()));
        assert_eq!(view.visible().len(), 250);
        assert_eq!(view.filtered().len(), 250);
    }

    #[test]
    fn short_result_keeps_page_floor() {
        let mut view = FeedView::new(many(3), &[]);
        assert!(!view.on_scroll(bottom()));
        assert_eq!(view.display_count(), PAGE_SIZE);
        assert_eq!(view.visible().len(), 3);
    }

    #[test]
    fn padded_query_matches_like_trimmed() {
        let mut view = FeedView::new(sample(), &[]);
        view.set_query("  trader ");
        assert_eq!(view.filtered().len(), 1);
        assert_eq!(view.query(), "  trader ");
    }

    #[test]
    fn scroll_far_from_bottom_does_nothing() {
        let mut view = FeedView::new(many(250), &[]);
        let top = Viewport {
            scroll_top: 0.0,
            scroll_height: 5000.0,
            client_height: 600.0,
        };
        assert!(!view.on_scroll(top));
        assert_eq!(view.display_count(), PAGE_SIZE);
    }

    #[test]
    fn query_change_resets_paging() {
        let mut view = FeedView::new(many(250), &[]);
        view.on_scroll(bottom());
        assert_eq!(view.display_count(), 200);
        assert_eq!(view.scroll_top(), 900.0);

        view.set_query("co1");
        assert_eq!(view.display_count(), PAGE_SIZE);
        assert_eq!(view.scroll_top(), 0.0);
    }

    #[test]
    fn category_change_resets_paging() {
        let mut view = FeedView::new(many(250), &[]);
        view.on_scroll(bottom());
        view.set_category(CategoryFilter::Only(Category::SoftwareEngineering));
        assert_eq!(view.display_count(), PAGE_SIZE);
    }

    #[test]
    fn same_query_keeps_paging() {
        let mut view = FeedView::new(many(250), &[]);
        view.set_query("co");
        view.on_scroll(bottom());
        view.set_query("co");
        assert_eq!(view.display_count(), 200);
    }

    #[test]
    fn sort_orders() {
        let mut view = FeedView::new(sample(), &[]);
        view.set_sort(SortOrder::CompanyAz);
        let companies: Vec<&str> = view.visible().iter().map(|r| r.company.as_str()).collect();
        assert_eq!(companies, vec!["Figma", "Jane Street", "Stripe", "Stripe"]);

        view.set_sort(SortOrder::RoleZa);
        assert_eq!(view.visible()[0].role, "Trader Intern");

        view.set_sort(SortOrder::Document);
        assert_eq!(view.visible()[0].role, "SWE Intern");
    }

    #[test]
    fn replace_listings_last_write_wins() {
        let mut view = FeedView::new(sample(), &[]);
        view.replace_listings(many(3));
        view.replace_listings(many(5));
        assert_eq!(view.filtered().len(), 5);
    }

    #[test]
    fn parse_filters() {
        assert_eq!("all".parse::<CategoryFilter>(), Ok(CategoryFilter::All));
        assert_eq!(
            "hw".parse::<CategoryFilter>(),
            Ok(CategoryFilter::Only(Category::HardwareEngineering))
        );
        assert_eq!("role-za".parse::<SortOrder>(), Ok(SortOrder::RoleZa));
        assert!("newest".parse::<SortOrder>().is_err());
    }
}
