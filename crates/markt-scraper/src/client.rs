//! HTTP client for the market calendar and listing pages.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

/// Source of raw page markup, keyed by URL.
///
/// [`MarketClient`] is the network implementation; tests substitute an
/// in-memory page set.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// Returns the body of the page at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] when the page cannot be fetched.
    async fn fetch_page(&self, url: &str) -> Result<String, ScraperError>;
}

/// Fetches HTML pages with a per-request timeout and exponential-backoff
/// retries on transient failures.
pub struct MarketClient {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff.
    backoff_base_secs: u64,
}

impl MarketClient {
    /// Creates a `MarketClient` with configured timeout, `User-Agent`, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches the HTML body of `url`, retrying transient errors.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::NotFound`]: HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status (5xx retried).
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries.
    /// - [`ScraperError::Http`]: network or TLS failure after all retries.
    pub async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async move {
            tracing::debug!(url, "fetching page");
            let response = self
                .client
                .get(url)
                .header(
                    reqwest::header::ACCEPT,
                    "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
                )
                .header(reqwest::header::ACCEPT_LANGUAGE, "nl-NL,nl;q=0.9,en;q=0.8")
                .send()
                .await?;
            let response = ensure_success(response, url)?;
            Ok::<String, ScraperError>(response.text().await?)
        })
        .await
    }
}

impl PageSource for MarketClient {
    async fn fetch_page(&self, url: &str) -> Result<String, ScraperError> {
        self.fetch_html(url).await
    }
}

/// Maps non-2xx responses onto typed errors.
pub(crate) fn ensure_success(response: Response, url: &str) -> Result<Response, ScraperError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(ScraperError::RateLimited {
            url: url.to_owned(),
            retry_after_secs,
        });
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ScraperError::NotFound {
            url: url.to_owned(),
        });
    }
    Err(ScraperError::UnexpectedStatus {
        status: status.as_u16(),
        url: url.to_owned(),
    })
}
