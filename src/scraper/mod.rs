//! Scraping: async HTTP client with mirror fallback, the TVTruyen selector
//! contract, and the paginated chapter-list crawl.

mod client;
mod error;

pub mod tvtruyen;

pub use client::{Client, ClientBuilder, FetchOutcome};
pub use error::ScraperError;
pub use tvtruyen::{crawl_chapter_list, parse_book_page};

use reqwest::Url;

/// Require an absolute http(s) URL with a host before any network activity.
pub fn ensure_book_url(input: &str) -> Result<(), ScraperError> {
    let url = Url::parse(input).map_err(|e| ScraperError::InvalidUrl {
        input: input.to_string(),
        reason: e.to_string(),
    })?;
    if url.host_str().is_none() {
        return Err(ScraperError::InvalidUrl {
            input: input.to_string(),
            reason: "URL has no host".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_book_url_accepts_https() {
        assert!(ensure_book_url("https://www.tvtruyen.com/truyen/vo-luyen").is_ok());
    }

    #[test]
    fn ensure_book_url_rejects_garbage() {
        let result = ensure_book_url("not-a-url");
        match &result {
            Err(ScraperError::InvalidUrl { input, .. }) if input == "not-a-url" => {}
            _ => panic!("expected InvalidUrl, got {:?}", result),
        }
    }

    #[test]
    fn ensure_book_url_rejects_hostless_url() {
        let result = ensure_book_url("file:///tmp/book.html");
        assert!(matches!(result, Err(ScraperError::InvalidUrl { .. })));
    }
}
