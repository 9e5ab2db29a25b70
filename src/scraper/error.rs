//! Shared error type for fetching and parsing.

use thiserror::Error;

/// Scraper error for URL validation, HTTP, parsing, and pagination safety nets.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Invalid URL: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("Network error: could not reach {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to read response body: {source}")]
    BodyRead { source: reqwest::Error },

    #[error("Could not parse page: {message}")]
    Parse { message: String },

    #[error("Book has no chapters (possibly deleted or access restricted).")]
    EmptyChapterList,

    /// Listing page {page} still advertised a next page but yielded no new
    /// chapters; the site is looping.
    #[error("Chapter list stopped advancing at page {page} (no new chapters; pagination loop).")]
    PaginationStalled { page: u32 },

    #[error("Chapter list exceeded {limit} pages; giving up on pagination.")]
    PaginationLimit { limit: u32 },
}
