//! tvtscrape: CLI downloader for TVTruyen web novels, outputting plain-text
//! chapter files plus one aggregate book file.

pub mod cli;
pub mod config;
pub mod download;
pub mod model;
pub mod output;
pub mod scraper;
pub mod text;

// Re-exports for CLI and consumers.
pub use config::ScrapeConfig;
pub use download::{download_chapters, DownloadSummary};
pub use model::{BookMeta, ChapterEntry, DownloadedChapter};
pub use scraper::{
    crawl_chapter_list, ensure_book_url, parse_book_page, Client, ClientBuilder, FetchOutcome,
    ScraperError,
};
pub use text::{html_to_text, normalize_whitespace};
