//! HTML page fetcher
//!
//! Handles every HTTP/HTTPS URL. Sends browser-like headers, fails fast on
//! non-2xx responses and non-HTML content, and reads the body as a bounded
//! stream.

use crate::client::FetchOptions;
use crate::error::EnrichError;
use crate::fetchers::Fetcher;
use crate::types::FetchedPage;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use tracing::{debug, error, warn};
use url::Url;

/// Accept header sent with every page request
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Accept-Language header sent with every page request
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.5";

/// Content types the extractor understands
const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// HTML page fetcher
pub struct HtmlFetcher;

impl HtmlFetcher {
    /// Create a new HTML fetcher
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HtmlFetcher {
    fn name(&self) -> &'static str {
        "html"
    }

    fn matches(&self, _url: &Url) -> bool {
        true
    }

    async fn fetch(&self, url: &Url, options: &FetchOptions) -> Result<FetchedPage, EnrichError> {
        let mut headers = HeaderMap::new();
        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(options.timeout)
            .timeout(options.timeout)
            .build()
            .map_err(EnrichError::ClientBuildError)?;

        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(EnrichError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::FetchHttpError {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !is_html_content_type(&content_type) {
            return Err(EnrichError::UnsupportedContentType(content_type));
        }

        let final_url = response.url().clone();
        let (body, truncated) = read_body_capped(response, options.max_body_bytes).await?;
        debug!(url = %final_url, bytes = body.len(), truncated, "Fetched page");

        Ok(FetchedPage {
            url: final_url,
            status_code: status.as_u16(),
            content_type,
            html: String::from_utf8_lossy(&body).into_owned(),
            truncated,
        })
    }
}

/// Check if a Content-Type header names an HTML document
fn is_html_content_type(content_type: &str) -> bool {
    let ct_lower = content_type.to_lowercase();
    HTML_CONTENT_TYPES.iter().any(|ct| ct_lower.contains(ct))
}

/// Read the response body, stopping once `limit` bytes are buffered
///
/// The request timeout still applies while streaming; a stalled body
/// surfaces as [`EnrichError::FetchTimeout`].
async fn read_body_capped(
    response: reqwest::Response,
    limit: usize,
) -> Result<(Bytes, bool), EnrichError> {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let bytes = chunk.map_err(|e| {
            error!("Error reading body chunk: {}", e);
            EnrichError::from_reqwest(e)
        })?;

        let remaining = limit.saturating_sub(body.len());
        if bytes.len() > remaining {
            body.extend_from_slice(&bytes[..remaining]);
            warn!(limit, "Body size limit reached, dropping the rest of the page");
            return Ok((Bytes::from(body), true));
        }
        body.extend_from_slice(&bytes);
    }

    Ok((Bytes::from(body), false))
}
