use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::parser::{parse_listings, ListingRecord};
use crate::settings::Settings;

/// Download the raw README. Single attempt; retrying is the caller's call.
pub async fn fetch_document(settings: &Settings) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    info!("Fetching listings README: {}", settings.source_url);
    let text = client
        .get(&settings.source_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
        .context("Failed to fetch listings README")?;

    info!("Fetched {} bytes", text.len());
    Ok(text)
}

/// Fetch and parse, treating any fetch failure as an empty feed.
pub async fn fetch_listings(settings: &Settings) -> Vec<ListingRecord> {
    match fetch_document(settings).await {
        Ok(doc) => parse_listings(&doc),
        Err(e) => {
            warn!("Could not load listings: {:#}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_source_degrades_to_empty() {
        let settings = Settings {
            source_url: "http://127.0.0.1:9/README.md".into(),
            timeout_secs: 2,
            ..Settings::default()
        };
        assert!(fetch_document(&settings).await.is_err());
        assert!(fetch_listings(&settings).await.is_empty());
    }
}
