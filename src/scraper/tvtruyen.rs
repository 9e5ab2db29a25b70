//! TVTruyen adapter: book page metadata and the paginated chapter list.
//!
//! The selector contract is fixed by the site; missing metadata fields come
//! back as empty strings rather than errors. Pagination follows the site's
//! `rel="next"` marker and is capped and stall-checked so an unreliable
//! signal cannot loop the crawl forever.

use crate::config::ScrapeConfig;
use crate::model::{BookMeta, ChapterEntry};
use crate::scraper::error::ScraperError;
use crate::scraper::Client;
use reqwest::Url;
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Status text marker meaning the book is complete.
const COMPLETED_MARKER: &str = "Full";

/// Parse a CSS selector or return a parse error (avoids panics from Selector::parse).
fn parse_selector(sel: &str) -> Result<Selector, ScraperError> {
    Selector::parse(sel).map_err(|e| ScraperError::Parse {
        message: format!("invalid selector {:?}: {}", sel, e),
    })
}

fn select_text(doc: &Html, sel: &Selector) -> String {
    doc.select(sel)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Extract book metadata from the book page.
///
/// Fields that the page does not provide come back empty; a missing status
/// element reads as ongoing.
pub fn parse_book_page(html: &str) -> Result<BookMeta, ScraperError> {
    let doc = Html::parse_document(html);
    let title_sel = parse_selector("h3.title#comic_name")?;
    let cover_sel = parse_selector(".book img")?;
    let author_sel = parse_selector(".author a.item-value")?;
    let desc_sel = parse_selector("section.limit-desc")?;
    let status_sel = parse_selector(".info .item-value.text-success")?;

    let title = select_text(&doc, &title_sel);
    let cover_url = doc
        .select(&cover_sel)
        .next()
        .and_then(|e| e.value().attr("src").map(String::from))
        .filter(|s| !s.is_empty());
    let author = select_text(&doc, &author_sel);
    let description = select_text(&doc, &desc_sel);
    let ongoing = !select_text(&doc, &status_sel).contains(COMPLETED_MARKER);

    Ok(BookMeta {
        title,
        cover_url,
        author,
        description,
        ongoing,
    })
}

/// One parsed listing page: its entries in document order and whether the
/// page advertises a further page.
#[derive(Debug)]
pub(crate) struct ListingPage {
    pub entries: Vec<ChapterEntry>,
    pub has_next: bool,
}

/// Parse chapter entries and the next-page marker from a listing page.
/// Relative hrefs are resolved against the page URL; anchors without an href
/// are skipped.
pub(crate) fn parse_listing_page(html: &str, page_url: &str) -> Result<ListingPage, ScraperError> {
    let doc = Html::parse_document(html);
    let entry_sel = parse_selector(".list-chapter li a")?;
    let name_sel = parse_selector(".chapter-text-all")?;
    let next_sel = parse_selector(r#"a[rel="next"]"#)?;

    let base = Url::parse(page_url).ok();
    let mut entries = Vec::new();
    for link in doc.select(&entry_sel) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let name = link
            .select(&name_sel)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        entries.push(ChapterEntry {
            name,
            url: resolve_reference(href, base.as_ref()),
        });
    }
    let has_next = doc.select(&next_sel).next().is_some();
    Ok(ListingPage { entries, has_next })
}

fn resolve_reference(href: &str, base: Option<&Url>) -> String {
    if let Some(base) = base {
        if let Ok(resolved) = base.join(href) {
            return resolved.to_string();
        }
    }
    href.to_string()
}

fn listing_page_url(book_url: &str, page: u32) -> String {
    format!("{}?page={}#list-chapter", book_url, page)
}

/// Walk the paginated chapter list from page 1 until the site stops
/// advertising a next page.
///
/// A listing page that fails to fetch ends pagination; whatever was collected
/// so far is returned. Two safety nets guard against an unreliable next-page
/// signal: a page cap (`PaginationLimit`) and a stall check
/// (`PaginationStalled` when a page contributes no previously-unseen
/// reference while still pointing onward).
pub async fn crawl_chapter_list(
    client: &Client,
    book_url: &str,
    config: &ScrapeConfig,
) -> Result<Vec<ChapterEntry>, ScraperError> {
    tracing::info!("fetching chapter list from {}", book_url);
    let mut entries: Vec<ChapterEntry> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut page: u32 = 1;

    loop {
        if page > config.max_listing_pages {
            return Err(ScraperError::PaginationLimit {
                limit: config.max_listing_pages,
            });
        }

        let page_url = listing_page_url(book_url, page);
        let html = match client.get(&page_url).await {
            Ok(html) => html,
            Err(e) => {
                // Partial results are acceptable; a dead listing page just
                // means no more pages.
                tracing::warn!("listing page {} failed ({}); stopping pagination", page, e);
                break;
            }
        };

        let listing = parse_listing_page(&html, &page_url)?;
        let mut new_refs = 0usize;
        for entry in &listing.entries {
            if seen.insert(entry.url.clone()) {
                new_refs += 1;
            }
        }
        tracing::debug!("listing page {}: {} entries", page, listing.entries.len());
        entries.extend(listing.entries);

        if !listing.has_next {
            break;
        }
        if new_refs == 0 {
            return Err(ScraperError::PaginationStalled { page });
        }
        page += 1;
    }

    Ok(entries)
}
