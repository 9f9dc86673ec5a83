//! Internship listings feed.
//!
//! Parses the community internship README (a Markdown document carrying an
//! HTML table) into [`ListingRecord`]s and reconciles them against the
//! applications a user already tracks.
//!
//! ```rust,ignore
//! let listings = internship_feed::parse_listings(&readme);
//! let mut view = FeedView::new(listings, &tracked);
//! view.set_query("backend");
//! for record in view.visible() {
//!     println!("{} - {}", record.company, record.role);
//! }
//! ```

pub mod db;
pub mod error;
pub mod fetch;
pub mod parser;
pub mod settings;
pub mod view;

pub use error::{PromoteError, SinkError};
pub use parser::rows::{LineTokenizer, RowTokenizer};
pub use parser::sections::Category;
pub use parser::{parse_listings, parse_listings_with, AssemblerState, ListingRecord, Listings};
pub use settings::Settings;
pub use view::promote::{ApplicationSink, NewApplication, Promoter, Status};
pub use view::tracked::{TrackedItem, TrackedSet};
pub use view::{CategoryCounts, CategoryFilter, FeedView, SortOrder, Viewport, PAGE_SIZE};
