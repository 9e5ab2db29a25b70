//! Configuration: optional TOML file plus the explicit per-run scrape
//! configuration.
//!
//! Config file search order: ./tvtscrape.toml, then
//! $XDG_CONFIG_HOME/tvtscrape/config.toml (or ~/.config/tvtscrape/config.toml).

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Chapters fetched concurrently per window.
pub const DEFAULT_CONCURRENCY: usize = 5;
/// Cooldown between download windows, in seconds.
pub const DEFAULT_WINDOW_DELAY_SECS: u64 = 1;
/// Upper bound on listing pages before pagination is declared runaway.
pub const DEFAULT_MAX_LISTING_PAGES: u32 = 1000;

const DEFAULT_SITE_PREFIX: &str = "https://www.tvtruyen.com/";
const DEFAULT_REFERER: &str = "https://www.tvtruyen.com/";
const DEFAULT_MIRROR_PREFIXES: [&str; 2] = [
    "https://cdn-2.cscldsck.com/chapters/",
    "https://cdn.cscldsck.com/chapters/",
];
const DEFAULT_PLACEHOLDER: &str = "Không thể tải nội dung chương. Vui lòng thử lại sau.";

/// Runtime configuration for one scrape run.
///
/// Everything the site contract pins down (mirror hosts, referer, placeholder
/// text) lives here as an explicit value with a documented default, so tests
/// and callers can swap any of it.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Window size for the batched downloader.
    pub concurrency: usize,
    /// Cooldown between windows (skipped after the final window).
    pub window_delay: Duration,
    /// Pagination iteration cap.
    pub max_listing_pages: u32,
    /// Canonical site URL prefix that chapter URLs start with.
    pub site_prefix: String,
    /// Content-mirror prefixes tried in order when fetching a chapter.
    pub mirror_prefixes: Vec<String>,
    /// Referer header sent on mirror requests.
    pub referer: String,
    /// Text standing in for a chapter that failed on every mirror.
    pub placeholder: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            window_delay: Duration::from_secs(DEFAULT_WINDOW_DELAY_SECS),
            max_listing_pages: DEFAULT_MAX_LISTING_PAGES,
            site_prefix: DEFAULT_SITE_PREFIX.to_string(),
            mirror_prefixes: DEFAULT_MIRROR_PREFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            referer: DEFAULT_REFERER.to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Default output root when -o is not set. Paths are relative to CWD.
    pub output_dir: Option<PathBuf>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Chapters fetched concurrently per window.
    pub concurrent_downloads: Option<usize>,
    /// Cooldown in seconds between download windows.
    pub window_delay_secs: Option<u64>,
    /// Upper bound on listing pages crawled.
    pub max_listing_pages: Option<u32>,
    /// Content-mirror URL prefixes, tried in order.
    pub mirror_prefixes: Option<Vec<String>>,
    /// Referer header sent on mirror requests.
    pub referer: Option<String>,
}

/// Search order: (1) ./tvtscrape.toml, (2) $XDG_CONFIG_HOME/tvtscrape/config.toml.
/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join("tvtscrape.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("tvtscrape").join("config.toml"));
    }
    for path in &paths {
        if path.exists() {
            let s = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
            let config: Config = toml::from_str(&s)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
            return Ok(Some(config));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let c: Config = toml::from_str("").unwrap();
        assert!(c.output_dir.is_none());
        assert!(c.user_agent.is_none());
        assert!(c.timeout_secs.is_none());
        assert!(c.concurrent_downloads.is_none());
        assert!(c.window_delay_secs.is_none());
        assert!(c.max_listing_pages.is_none());
        assert!(c.mirror_prefixes.is_none());
        assert!(c.referer.is_none());
    }

    #[test]
    fn parse_full_config() {
        let s = r#"
            output_dir = "books"
            user_agent = "Custom/1.0"
            timeout_secs = 60
            concurrent_downloads = 8
            window_delay_secs = 2
            max_listing_pages = 50
            mirror_prefixes = ["https://cdn-a.test/chapters/", "https://cdn-b.test/chapters/"]
            referer = "https://example.test/"
        "#;
        let c: Config = toml::from_str(s).unwrap();
        assert_eq!(c.output_dir.as_deref(), Some(std::path::Path::new("books")));
        assert_eq!(c.user_agent.as_deref(), Some("Custom/1.0"));
        assert_eq!(c.timeout_secs, Some(60));
        assert_eq!(c.concurrent_downloads, Some(8));
        assert_eq!(c.window_delay_secs, Some(2));
        assert_eq!(c.max_listing_pages, Some(50));
        assert_eq!(
            c.mirror_prefixes.as_deref(),
            Some(
                [
                    "https://cdn-a.test/chapters/".to_string(),
                    "https://cdn-b.test/chapters/".to_string()
                ]
                .as_slice()
            )
        );
        assert_eq!(c.referer.as_deref(), Some("https://example.test/"));
    }

    #[test]
    fn parse_partial_config() {
        let c: Config = toml::from_str("concurrent_downloads = 3").unwrap();
        assert_eq!(c.concurrent_downloads, Some(3));
        assert!(c.output_dir.is_none());
        assert!(c.mirror_prefixes.is_none());
    }

    #[test]
    fn invalid_toml_errors() {
        assert!(toml::from_str::<Config>("output_dir = [").is_err());
    }

    #[test]
    fn scrape_config_documented_defaults() {
        let c = ScrapeConfig::default();
        assert_eq!(c.concurrency, 5);
        assert_eq!(c.window_delay, Duration::from_secs(1));
        assert_eq!(c.max_listing_pages, 1000);
        assert_eq!(c.mirror_prefixes.len(), 2);
        assert!(c.mirror_prefixes[0].starts_with("https://cdn-2."));
        assert!(c.mirror_prefixes[1].starts_with("https://cdn."));
        assert_eq!(c.referer, "https://www.tvtruyen.com/");
        assert!(c.site_prefix.starts_with("https://www.tvtruyen.com"));
        assert!(!c.placeholder.is_empty());
    }
}
