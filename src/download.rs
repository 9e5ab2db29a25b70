//! Batched concurrent chapter download.
//!
//! Entries are split into consecutive windows of `ScrapeConfig::concurrency`
//! chapters. Each window's fetches are dispatched together and awaited
//! jointly, so peak concurrency is the window size and window N+1 never
//! starts before window N has fully settled. A cooldown runs between windows
//! (skipped after the last). Output order always follows the dispatch index,
//! never completion order.

use crate::config::ScrapeConfig;
use crate::model::{BookMeta, ChapterEntry, DownloadedChapter};
use crate::output::{self, OutputError};
use crate::scraper::{Client, FetchOutcome};
use crate::text::{html_to_text, normalize_whitespace};
use indicatif::ProgressBar;
use std::path::Path;

/// Outcome counters for one download run.
///
/// `placeholders` and `write_failures` let callers tell a degraded run from a
/// clean one; neither aborts the run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadSummary {
    pub chapters: usize,
    pub placeholders: usize,
    pub write_failures: usize,
}

/// Download every chapter, write the per-chapter files as each window
/// settles, and finish with the aggregate file.
///
/// A chapter that fails on every mirror gets the configured placeholder text
/// and is persisted like any other result. Per-chapter write failures are
/// logged and counted; only the final aggregate write is fatal.
pub async fn download_chapters(
    client: &Client,
    config: &ScrapeConfig,
    meta: &BookMeta,
    entries: &[ChapterEntry],
    source_url: &str,
    book_dir: &Path,
    progress: Option<&ProgressBar>,
) -> Result<DownloadSummary, OutputError> {
    let window_size = config.concurrency.max(1);
    let window_count = entries.len().div_ceil(window_size);
    let mut aggregate = output::book_header(meta, source_url);
    let mut summary = DownloadSummary {
        chapters: entries.len(),
        ..DownloadSummary::default()
    };

    for (window_index, window) in entries.chunks(window_size).enumerate() {
        tracing::info!(
            "downloading window {}/{} ({} chapters)",
            window_index + 1,
            window_count,
            window.len()
        );

        let tasks = window.iter().enumerate().map(|(position, entry)| {
            let index = window_index * window_size + position;
            async move {
                match client.fetch_chapter(&entry.url, config).await {
                    FetchOutcome::Content(html) => {
                        let text = normalize_whitespace(&html_to_text(&html));
                        (
                            DownloadedChapter {
                                index,
                                name: entry.name.clone(),
                                text,
                            },
                            false,
                        )
                    }
                    FetchOutcome::Failed { url } => {
                        tracing::warn!(
                            "chapter {} unavailable on all mirrors ({})",
                            index + 1,
                            url
                        );
                        (
                            DownloadedChapter {
                                index,
                                name: entry.name.clone(),
                                text: config.placeholder.clone(),
                            },
                            true,
                        )
                    }
                }
            }
        });
        // join_all yields results in dispatch order, so completion order
        // within the window cannot reorder the output.
        let results = futures::future::join_all(tasks).await;

        for (chapter, is_placeholder) in &results {
            if *is_placeholder {
                summary.placeholders += 1;
            }
            if let Err(e) = output::write_chapter(book_dir, chapter) {
                tracing::warn!("{}", e);
                summary.write_failures += 1;
            }
            aggregate.push_str(&output::chapter_block(chapter));
            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        if window_index + 1 < window_count {
            tokio::time::sleep(config.window_delay).await;
        }
    }

    output::write_aggregate(book_dir, &meta.title, &aggregate)?;
    Ok(summary)
}
