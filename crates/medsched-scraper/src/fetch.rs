//! Page retrieval.
//!
//! Extractors never fetch anything themselves; the pipeline hands every
//! request to a [`PageFetcher`]. [`HttpFetcher`] is the real implementation,
//! tests substitute an in-memory one.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::Client;

use crate::error::FetchError;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_ES: &str = "es-PE,es;q=0.9,en;q=0.5";

/// One GET request: a URL plus the optional `Referer` some detail endpoints
/// insist on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub referer: Option<String>,
}

impl FetchRequest {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            referer: None,
        }
    }

    #[must_use]
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Retrieve the body of `request` as text.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the page cannot be retrieved for any
    /// reason: transport failure, non-2xx status, or an empty body.
    async fn fetch(&self, request: &FetchRequest) -> Result<String, FetchError>;
}

/// `reqwest`-backed fetcher with a fixed pause before every request.
pub struct HttpFetcher {
    client: Client,
    inter_request_delay: Duration,
}

impl HttpFetcher {
    /// Build a fetcher with the given timeout, `User-Agent`, and politeness
    /// delay.
    ///
    /// `accept_invalid_certs` disables TLS certificate verification; it is
    /// only meant for sources whose certificate chain is known to be broken.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        inter_request_delay_ms: u64,
        accept_invalid_certs: bool,
    ) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(ACCEPT_LANGUAGE_ES),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .default_headers(headers)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            inter_request_delay: Duration::from_millis(inter_request_delay_ms),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<String, FetchError> {
        if !self.inter_request_delay.is_zero() {
            tokio::time::sleep(self.inter_request_delay).await;
        }

        let mut builder = self.client.get(&request.url);
        if let Some(referer) = &request.referer {
            builder = builder.header(REFERER, referer);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %request.url, status = status.as_u16(), "non-success response");
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: request.url.clone(),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody {
                url: request.url.clone(),
            });
        }
        Ok(body)
    }
}
