//! Filesystem output: per-chapter files and the aggregate book file.
//!
//! Layout: `<output-root>/<sanitized-title>/chuong<N>.txt` for each chapter
//! (N is 1-based) plus `<sanitized-title>.txt` holding the metadata header
//! and every chapter in order.

use crate::model::{BookMeta, DownloadedChapter};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Divider line between the header and the chapters in the aggregate file.
pub const DIVIDER: &str = "---------------------------------------";

const STATUS_ONGOING: &str = "Đang tiếp tục";
const STATUS_COMPLETED: &str = "Hoàn thành";

/// Errors from the output writers.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Replace filesystem-unsafe characters with `_` and collapse runs of
/// whitespace to a single space. An empty result falls back to "book".
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c => c,
        })
        .collect();
    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        "book".to_string()
    } else {
        collapsed
    }
}

/// Create (recursively, idempotently) and return the book's directory.
pub fn ensure_book_dir(output_root: &Path, title: &str) -> Result<PathBuf, OutputError> {
    let dir = output_root.join(sanitize_filename(title));
    fs::create_dir_all(&dir).map_err(|e| OutputError::CreateDir {
        path: dir.clone(),
        source: e,
    })?;
    Ok(dir)
}

/// File name for a chapter by its 0-based global index.
pub fn chapter_file_name(index: usize) -> String {
    format!("chuong{}.txt", index + 1)
}

/// Write one chapter file: name, blank line, normalized text.
pub fn write_chapter(dir: &Path, chapter: &DownloadedChapter) -> Result<PathBuf, OutputError> {
    let path = dir.join(chapter_file_name(chapter.index));
    let content = format!("{}\n\n{}", chapter.name, chapter.text);
    fs::write(&path, content).map_err(|e| OutputError::Write {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}

/// Metadata header block at the top of the aggregate file.
pub fn book_header(meta: &BookMeta, source_url: &str) -> String {
    let status = if meta.ongoing {
        STATUS_ONGOING
    } else {
        STATUS_COMPLETED
    };
    format!(
        "{}\n\nAuthor: {}\n\nDescription: {}\n\nStatus: {}\n\nDownloaded from: {}\n\n{}\n\n",
        meta.title, meta.author, meta.description, status, source_url, DIVIDER
    )
}

/// One chapter's block in the aggregate file.
pub fn chapter_block(chapter: &DownloadedChapter) -> String {
    format!("{}\n{}\n\n{}\n\n", chapter.name, DIVIDER, chapter.text)
}

/// Write the aggregate file, named after the sanitized title.
pub fn write_aggregate(dir: &Path, title: &str, content: &str) -> Result<PathBuf, OutputError> {
    let path = dir.join(format!("{}.txt", sanitize_filename(title)));
    fs::write(&path, content).map_err(|e| OutputError::Write {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}
