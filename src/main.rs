use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use internship_feed::view::tracked::TrackedKey;
use internship_feed::{
    db, fetch, parse_listings, Category, CategoryCounts, CategoryFilter, FeedView, ListingRecord,
    Promoter, Settings, SortOrder, Viewport, PAGE_SIZE,
};

#[derive(Parser)]
#[command(name = "internship_feed", about = "Internship listings feed reconciled against your tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch listings and show the untracked ones
    List {
        /// Search company, role or location
        #[arg(short, long, default_value = "")]
        query: String,
        /// Category filter ("all", a category name, or swe/pm/ds/quant/hw)
        #[arg(short, long, default_value = "all")]
        category: CategoryFilter,
        /// document, company-az, company-za, role-az, role-za
        #[arg(short, long, default_value = "document")]
        sort: SortOrder,
        /// Pages of results to show
        #[arg(short, long, default_value = "1")]
        pages: usize,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Per-category counts of untracked listings
    Counts,
    /// Add a listing to the tracker
    Promote {
        #[arg(long)]
        company: String,
        #[arg(long)]
        role: String,
    },
    /// Show tracked applications
    Tracked,
    /// Parse a local README copy (offline)
    Parse {
        #[arg(short, long)]
        file: String,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;

    let result = match cli.command {
        Commands::List {
            query,
            category,
            sort,
            pages,
            json,
        } => {
            let mut view = load_view(&settings).await?;
            view.set_query(query);
            view.set_category(category);
            view.set_sort(sort);
            // Same growth path the UI takes on scroll.
            for _ in 1..pages {
                view.on_scroll(Viewport::default());
            }

            let visible = view.visible();
            if json {
                println!("{}", serde_json::to_string_pretty(&visible)?);
            } else {
                print_table(&visible);
                println!(
                    "\nShowing {} of {} internships (page size {})",
                    visible.len(),
                    view.filtered().len(),
                    PAGE_SIZE
                );
            }
            Ok(())
        }
        Commands::Counts => {
            let view = load_view(&settings).await?;
            print_counts(&view.category_counts());
            Ok(())
        }
        Commands::Promote { company, role } => {
            let tracker = db::SqliteTracker::new(db::connect(&settings.db_path)?)?;
            let view = load_view(&settings).await?;
            let wanted = TrackedKey::new(&company, &role);
            let Some(record) = view
                .reconciled()
                .into_iter()
                .find(|r| TrackedKey::of(r) == wanted)
                .cloned()
            else {
                bail!("No untracked listing for {} / {}", company, role);
            };

            let item = Promoter::new().promote(&record, &tracker).await?;
            println!("Tracking {} / {}", item.company, item.role);
            Ok(())
        }
        Commands::Tracked => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let rows = db::fetch_applications(&conn)?;
            if rows.is_empty() {
                println!("No tracked applications.");
                return Ok(());
            }
            println!(
                "{:>4} | {:<24} | {:<32} | {:<12} | {:<10}",
                "#", "Company", "Position", "Status", "Applied"
            );
            println!("{}", "-".repeat(94));
            for r in &rows {
                println!(
                    "{:>4} | {:<24} | {:<32} | {:<12} | {:<10}",
                    r.id,
                    truncate(&r.company, 24),
                    truncate(&r.position, 32),
                    r.status,
                    r.date_applied.to_string()
                );
            }
            Ok(())
        }
        Commands::Parse { file, json } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file))?;
            let listings = parse_listings(&text);
            if json {
                println!("{}", serde_json::to_string_pretty(&listings)?);
            } else {
                let refs: Vec<&ListingRecord> = listings.iter().collect();
                print_table(&refs);
                println!("\n{} listings", listings.len());
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

/// Fetch, parse and reconcile against the tracker DB.
async fn load_view(settings: &Settings) -> Result<FeedView> {
    let conn = db::connect(&settings.db_path)?;
    db::init_schema(&conn)?;
    let tracked = db::fetch_tracked(&conn)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Loading internships...");
    pb.enable_steady_tick(Duration::from_millis(100));
    let doc = fetch::fetch_document(settings).await;
    pb.finish_and_clear();

    let doc = doc.context("Failed to load recommended internships")?;
    Ok(FeedView::new(parse_listings(&doc), &tracked))
}

fn print_table(rows: &[&ListingRecord]) {
    if rows.is_empty() {
        println!("No internships found.");
        return;
    }
    println!(
        "{:>4} | {:<22} | {:<36} | {:<20} | {:>6} | {:<20}",
        "#", "Company", "Role", "Location", "Posted", "Category"
    );
    println!("{}", "-".repeat(124));
    for (i, r) in rows.iter().enumerate() {
        println!(
            "{:>4} | {:<22} | {:<36} | {:<20} | {:>6} | {:<20}",
            i + 1,
            truncate(&r.company, 22),
            truncate(&r.role, 36),
            truncate(&r.location, 20),
            r.posted,
            r.category
        );
    }
}

fn print_counts(counts: &CategoryCounts) {
    println!("All ({})", counts.total);
    for c in Category::ALL {
        println!("  {} ({})", c, counts.get(c));
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
