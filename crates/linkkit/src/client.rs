//! HTTP client for LinkKit
//!
//! This module provides the fetch entry points used by the pipeline.
//! The actual fetch logic is implemented by fetchers in the [`fetchers`](crate::fetchers) module.

use crate::error::EnrichError;
use crate::fetchers::FetcherRegistry;
use crate::types::FetchedPage;
use std::time::Duration;
use url::Url;

/// Default fetch timeout (connect + headers + body)
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default cap on bytes read from a response body
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Fetch options that can be configured via the enricher builder
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Custom User-Agent
    pub user_agent: Option<String>,
    /// Allow list of URL prefixes
    pub allow_prefixes: Vec<String>,
    /// Block list of URL prefixes
    pub block_prefixes: Vec<String>,
    /// Timeout for the whole request
    pub timeout: Duration,
    /// Maximum body size in bytes
    pub max_body_bytes: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            allow_prefixes: Vec::new(),
            block_prefixes: Vec::new(),
            timeout: DEFAULT_FETCH_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Parse and validate a submitted URL
///
/// Only absolute `http` and `https` URLs are accepted. Inputs without a
/// scheme (`example.com`) are rejected; normalizing them is up to the caller.
pub fn parse_http_url(raw: &str) -> Result<Url, EnrichError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(EnrichError::MissingUrl);
    }

    let url = Url::parse(raw).map_err(|_| EnrichError::InvalidUrlScheme)?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(EnrichError::InvalidUrlScheme),
    }
}

/// Fetch an HTML page with default options
pub async fn fetch_page(url: &str) -> Result<FetchedPage, EnrichError> {
    fetch_page_with_options(url, &FetchOptions::default()).await
}

/// Fetch an HTML page with custom options
///
/// Uses the default fetcher registry.
/// For custom fetcher configuration, use [`FetcherRegistry`] directly.
pub async fn fetch_page_with_options(
    url: &str,
    options: &FetchOptions,
) -> Result<FetchedPage, EnrichError> {
    let url = parse_http_url(url)?;
    FetcherRegistry::with_defaults().fetch(&url, options).await
}
