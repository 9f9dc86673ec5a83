use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/SimplifyJobs/Summer2026-Internships/dev/README.md";
const DEFAULT_DB_PATH: &str = "data/tracker.sqlite";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Raw README the listings are parsed from.
    pub source_url: String,
    /// SQLite file holding tracked applications.
    pub db_path: String,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            db_path: DEFAULT_DB_PATH.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Defaults, then `internship_feed.toml` if present, then `FEED_*` env vars.
    pub fn load() -> Result<Self> {
        Self::builder()?
            .add_source(File::with_name("internship_feed").required(false))
            .add_source(Environment::with_prefix("FEED"))
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let d = Settings::default();
        Config::builder()
            .set_default("source_url", d.source_url)?
            .set_default("db_path", d.db_path)?
            .set_default("timeout_secs", d.timeout_secs as i64)
            .context("Failed to set default settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_deserialize() {
        let s: Settings = Settings::builder().unwrap().build().unwrap().try_deserialize().unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.toml");
        std::fs::write(&path, "db_path = \"/tmp/x.sqlite\"\ntimeout_secs = 5\n").unwrap();

        let s: Settings = Settings::builder()
            .unwrap()
            .add_source(File::from(path))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(s.db_path, "/tmp/x.sqlite");
        assert_eq!(s.timeout_secs, 5);
        assert_eq!(s.source_url, DEFAULT_SOURCE_URL);
    }

    #[test]
    fn env_overrides_defaults() {
        std::env::set_var("FEED_TIMEOUT_SECS", "7");
        let s: Settings = Settings::builder()
            .unwrap()
            .add_source(Environment::with_prefix("FEED"))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        std::env::remove_var("FEED_TIMEOUT_SECS");
        assert_eq!(s.timeout_secs, 7);
        assert_eq!(s.db_path, DEFAULT_DB_PATH);
    }
}
