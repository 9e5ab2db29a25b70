//! CLI parsing and orchestration. Parses args, runs the pipeline
//! (book page -> chapter list -> batched download -> files), and maps
//! errors to exit codes.

use crate::config::{self, ScrapeConfig};
use crate::download::download_chapters;
use crate::output::{ensure_book_dir, OutputError};
use crate::scraper::{self, crawl_chapter_list, parse_book_page, Client, ScraperError};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Scraper(#[from] ScraperError),

    #[error("{0}")]
    Output(#[from] OutputError),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) => 1,
            CliRunError::Scraper(_) => 2,
            CliRunError::Output(_) => 3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "tvtscrape")]
#[command(about = "Download a TVTruyen book as plain-text chapter files")]
#[command(
    after_help = "Config file keys (output_dir, user_agent, timeout_secs, concurrent_downloads, window_delay_secs, max_listing_pages, mirror_prefixes, referer) are documented in the README. CLI flags override config."
)]
pub struct Args {
    /// Book URL (the TVTruyen book page).
    pub url: String,

    /// Chapters fetched concurrently per window. Default: 5.
    #[arg(value_parser = parse_concurrency)]
    pub concurrency: Option<usize>,

    /// Output root directory. Default: ./downloaded_books (or output_dir from config).
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Cooldown in seconds between download windows (default 1).
    #[arg(long)]
    pub delay: Option<u64>,

    /// Request timeout in seconds (overrides config; default 30).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// HTTP User-Agent (overrides config).
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Upper bound on listing pages crawled before pagination is declared runaway (default 1000).
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Suppress progress output (errors only).
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_concurrency(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("Invalid concurrency: '{}' is not a number", s))?;
    if n == 0 {
        return Err("Invalid concurrency: must be at least 1".to_string());
    }
    Ok(n)
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and message on failure.
pub async fn run(args: &Args) -> Result<(), CliRunError> {
    scraper::ensure_book_url(&args.url).map_err(|e| {
        CliRunError::InvalidInput(format!(
            "{}. Example: https://www.tvtruyen.com/truyen/vo-luyen-dien-phong",
            e
        ))
    })?;

    let file_config = config::load_config().map_err(CliRunError::InvalidInput)?;

    let output_root: PathBuf = args
        .output_dir
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.output_dir.clone()))
        .unwrap_or_else(|| PathBuf::from("downloaded_books"));

    let defaults = ScrapeConfig::default();
    let scrape_config = ScrapeConfig {
        concurrency: args
            .concurrency
            .or_else(|| file_config.as_ref().and_then(|c| c.concurrent_downloads))
            .unwrap_or(defaults.concurrency)
            .max(1),
        window_delay: Duration::from_secs(
            args.delay
                .or_else(|| file_config.as_ref().and_then(|c| c.window_delay_secs))
                .unwrap_or(defaults.window_delay.as_secs()),
        ),
        max_listing_pages: args
            .max_pages
            .or_else(|| file_config.as_ref().and_then(|c| c.max_listing_pages))
            .unwrap_or(defaults.max_listing_pages),
        mirror_prefixes: file_config
            .as_ref()
            .and_then(|c| c.mirror_prefixes.clone())
            .unwrap_or_else(|| defaults.mirror_prefixes.clone()),
        referer: file_config
            .as_ref()
            .and_then(|c| c.referer.clone())
            .unwrap_or_else(|| defaults.referer.clone()),
        ..defaults
    };

    let mut builder = Client::builder();
    if let Some(secs) = args
        .timeout
        .or_else(|| file_config.as_ref().and_then(|c| c.timeout_secs))
    {
        builder = builder.timeout_secs(secs);
    }
    if let Some(ua) = args
        .user_agent
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.user_agent.clone()))
    {
        builder = builder.user_agent(ua);
    }
    let client = builder
        .build()
        .map_err(|e| CliRunError::InvalidInput(format!("Failed to create HTTP client: {}", e)))?;

    // The book page is the only fatal fetch: nothing is written before it succeeds.
    tracing::info!("fetching book details from {}", args.url);
    let html = client.get(&args.url).await?;
    let meta = parse_book_page(&html)?;
    tracing::info!("downloading book: {} by {}", meta.title, meta.author);

    let entries = crawl_chapter_list(&client, &args.url, &scrape_config).await?;
    if entries.is_empty() {
        return Err(CliRunError::Scraper(ScraperError::EmptyChapterList));
    }
    tracing::info!("found {} chapters", entries.len());

    let book_dir = ensure_book_dir(&output_root, &meta.title)?;

    let progress = if args.quiet {
        None
    } else {
        let bar = indicatif::ProgressBar::new(entries.len() as u64);
        bar.set_style(
            indicatif::ProgressStyle::default_bar()
                .template("{spinner} {msg} [{bar:40}] {pos}/{len} ({elapsed})")
                .unwrap()
                .progress_chars("█▉▊▋▌▍▎▏ "),
        );
        bar.set_message("Fetching chapters");
        Some(bar)
    };

    let summary = download_chapters(
        &client,
        &scrape_config,
        &meta,
        &entries,
        &args.url,
        &book_dir,
        progress.as_ref(),
    )
    .await?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if summary.placeholders > 0 || summary.write_failures > 0 {
        tracing::warn!(
            "completed with {} placeholder chapter(s) and {} write failure(s)",
            summary.placeholders,
            summary.write_failures
        );
    }
    if !args.quiet {
        eprintln!(
            "Wrote {} chapters to {}",
            summary.chapters,
            book_dir.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn parse_concurrency_valid() {
        assert_eq!(parse_concurrency("1").unwrap(), 1);
        assert_eq!(parse_concurrency("10").unwrap(), 10);
    }

    #[test]
    fn parse_concurrency_rejects_zero() {
        assert!(parse_concurrency("0").is_err());
    }

    #[test]
    fn parse_concurrency_rejects_non_numeric() {
        assert!(parse_concurrency("five").is_err());
        assert!(parse_concurrency("-2").is_err());
    }

    #[test]
    fn args_require_url() {
        assert!(Args::try_parse_from(["tvtscrape"]).is_err());
    }

    #[test]
    fn args_parse_url_and_concurrency() {
        let args =
            Args::try_parse_from(["tvtscrape", "https://www.tvtruyen.com/truyen/x", "8"]).unwrap();
        assert_eq!(args.url, "https://www.tvtruyen.com/truyen/x");
        assert_eq!(args.concurrency, Some(8));
        assert!(!args.quiet);
    }

    #[test]
    fn args_concurrency_defaults_to_none() {
        let args = Args::try_parse_from(["tvtscrape", "https://example.test/"]).unwrap();
        assert_eq!(args.concurrency, None);
    }

    const BOOK_PAGE: &str = r#"<html><body>
<h3 class="title" id="comic_name">Vo Luyen</h3>
<div class="author"><a class="item-value" href="/tac-gia/x">Mạc Mặc</a></div>
<section class="limit-desc">Một câu chuyện.</section>
</body></html>"#;

    const LISTING_PAGE_1: &str = r#"<ul class="list-chapter">
<li><a href="/chuong-1"><span class="chapter-text-all">Chương 1</span></a></li>
<li><a href="/chuong-2"><span class="chapter-text-all">Chương 2</span></a></li>
</ul><a rel="next" href="?page=2">&raquo;</a>"#;

    const LISTING_PAGE_2: &str = r#"<ul class="list-chapter">
<li><a href="/chuong-3"><span class="chapter-text-all">Chương 3</span></a></li>
</ul>"#;

    // Chapter URLs from the mock server do not carry the canonical site
    // prefix, so the mirror rewrite is a no-op and the first attempt hits
    // the mock directly.
    #[tokio::test]
    async fn run_downloads_a_book_across_listing_pages() -> anyhow::Result<()> {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/truyen/book"))
            .and(query_param_is_missing("page"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BOOK_PAGE))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/truyen/book"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LISTING_PAGE_1))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/truyen/book"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LISTING_PAGE_2))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/chuong-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Đoạn 1a<br>Đoạn 1b"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/chuong-2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Nội dung 2"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/chuong-3"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Nội dung 3"))
            .expect(1)
            .mount(&server)
            .await;

        let out = tempfile::tempdir()?;
        let url = format!("{}/truyen/book", server.uri());
        let args = Args::try_parse_from([
            "tvtscrape",
            &url,
            "2",
            "-o",
            out.path().to_str().unwrap(),
            "--delay",
            "0",
            "-q",
        ])?;
        run(&args).await?;

        let book_dir = out.path().join("Vo Luyen");
        assert_eq!(
            std::fs::read_to_string(book_dir.join("chuong1.txt"))?,
            "Chương 1\n\nĐoạn 1a\nĐoạn 1b"
        );
        assert_eq!(
            std::fs::read_to_string(book_dir.join("chuong2.txt"))?,
            "Chương 2\n\nNội dung 2"
        );
        assert_eq!(
            std::fs::read_to_string(book_dir.join("chuong3.txt"))?,
            "Chương 3\n\nNội dung 3"
        );
        assert!(!book_dir.join("chuong4.txt").exists());

        let aggregate = std::fs::read_to_string(book_dir.join("Vo Luyen.txt"))?;
        assert!(aggregate.starts_with("Vo Luyen\n\nAuthor: Mạc Mặc\n"));
        assert!(aggregate.contains(&format!("Downloaded from: {}", url)));
        let p1 = aggregate.find("Đoạn 1a").unwrap();
        let p2 = aggregate.find("Nội dung 2").unwrap();
        let p3 = aggregate.find("Nội dung 3").unwrap();
        assert!(p1 < p2 && p2 < p3);
        Ok(())
    }

    #[test]
    fn cli_run_error_exit_codes() {
        assert_eq!(CliRunError::InvalidInput("x".into()).exit_code(), 1);
        assert_eq!(
            CliRunError::Scraper(ScraperError::EmptyChapterList).exit_code(),
            2
        );
        assert_eq!(
            CliRunError::Output(OutputError::Write {
                path: PathBuf::from("x"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "boom"),
            })
            .exit_code(),
            3
        );
    }
}
