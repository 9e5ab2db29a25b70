//! Canonical data model for one scraped book.
//!
//! The book page parser and the pagination crawler produce these shapes; the
//! downloader and output writer consume them.

/// Book metadata extracted once from the book page. Never mutated after
/// extraction; only interpolated into the aggregate output header.
#[derive(Debug, Clone)]
pub struct BookMeta {
    pub title: String,
    pub cover_url: Option<String>,
    pub author: String,
    pub description: String,
    /// False when the site marks the book complete.
    pub ongoing: bool,
}

/// One chapter as discovered on a listing page.
///
/// Discovery order across pagination is the canonical chapter order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterEntry {
    pub name: String,
    /// Absolute URL, resolved against the listing page when the href was relative.
    pub url: String,
}

/// A fetched and normalized chapter.
///
/// `index` is 0-based and assigned at dispatch time; it is the authority for
/// file naming and aggregate order, independent of completion order within a
/// download window.
#[derive(Debug, Clone)]
pub struct DownloadedChapter {
    pub index: usize,
    pub name: String,
    pub text: String,
}
