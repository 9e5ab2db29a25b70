//! Async HTTP client with the chapter mirror-fallback policy.
//!
//! Book and listing pages are fetched directly. Chapter content goes through
//! the content mirrors: the canonical site prefix is rewritten to each mirror
//! prefix in turn and fetched with a fixed referer; the first success wins.
//! There is no backoff and no further retry; one pass over the mirror list is
//! the whole resilience policy.

use crate::config::ScrapeConfig;
use crate::scraper::error::ScraperError;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; tvtscrape/0.1; +https://github.com/tvtscrape)";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 10;

/// Result of one chapter fetch. Atomic from the caller's perspective: either
/// the full markup or a failure marker carrying the attempted reference.
#[derive(Debug)]
pub enum FetchOutcome {
    Content(String),
    Failed { url: String },
}

/// Async HTTP client wrapper shared by every stage of the pipeline.
#[derive(Debug)]
pub struct Client {
    inner: reqwest::Client,
}

impl Client {
    /// Build a client with default User-Agent and timeout.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::builder().build()
    }

    /// Builder for custom User-Agent and/or timeout.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// GET a page. Non-2xx is an error; the body is returned as UTF-8 text.
    pub async fn get(&self, url: &str) -> Result<String, ScraperError> {
        let response = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|e| ScraperError::Network {
                url: url.to_string(),
                source: e,
            })?;
        read_body(response, url).await
    }

    /// GET a page with an explicit referer header.
    pub async fn get_with_referer(
        &self,
        url: &str,
        referer: &str,
    ) -> Result<String, ScraperError> {
        let response = self
            .inner
            .get(url)
            .header(reqwest::header::REFERER, referer)
            .send()
            .await
            .map_err(|e| ScraperError::Network {
                url: url.to_string(),
                source: e,
            })?;
        read_body(response, url).await
    }

    /// Fetch chapter content through the configured mirrors.
    ///
    /// The canonical site prefix is rewritten to each mirror prefix in order;
    /// each attempt carries the configured referer. The first successful body
    /// is returned; if every mirror fails the outcome is `Failed` with the
    /// original reference, and the caller decides what stands in for the text.
    pub async fn fetch_chapter(&self, url: &str, config: &ScrapeConfig) -> FetchOutcome {
        for prefix in &config.mirror_prefixes {
            let mirror_url = rewrite_prefix(url, &config.site_prefix, prefix);
            match self.get_with_referer(&mirror_url, &config.referer).await {
                Ok(body) => return FetchOutcome::Content(body),
                Err(e) => {
                    tracing::warn!("chapter fetch failed at {}: {}", mirror_url, e);
                }
            }
        }
        FetchOutcome::Failed {
            url: url.to_string(),
        }
    }
}

/// Rewrite `url` by swapping the `from` prefix for `to`. URLs that do not
/// start with `from` are returned unchanged.
pub(crate) fn rewrite_prefix(url: &str, from: &str, to: &str) -> String {
    match url.strip_prefix(from) {
        Some(rest) => format!("{}{}", to, rest),
        None => url.to_string(),
    }
}

async fn read_body(response: reqwest::Response, url: &str) -> Result<String, ScraperError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ScraperError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    response
        .text()
        .await
        .map_err(|e| ScraperError::BodyRead { source: e })
}

/// Builder for [Client] with optional User-Agent and timeout.
#[derive(Debug)]
pub struct ClientBuilder {
    user_agent: Option<String>,
    timeout_secs: u64,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientBuilder {
    /// Set a custom User-Agent. If not set, a browser-like default is used.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set request timeout in seconds. Default 30.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<Client, reqwest::Error> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let inner = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(user_agent)
            .timeout(Duration::from_secs(self.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Client { inner })
    }
}
