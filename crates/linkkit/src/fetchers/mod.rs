//! Fetcher system for page retrieval
//!
//! Design: Each fetcher handles specific URL patterns with custom logic.
//! FetcherRegistry dispatches to the first matching fetcher.

mod html;

pub use html::HtmlFetcher;

use crate::client::FetchOptions;
use crate::error::EnrichError;
use crate::types::FetchedPage;
use async_trait::async_trait;
use url::Url;

/// Trait for page fetchers
///
/// Each fetcher declares what URLs it can handle via `matches()` and
/// performs the actual fetch via `fetch()`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Unique identifier for this fetcher (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Returns true if this fetcher can handle the given URL
    ///
    /// More specific fetchers should be registered before generic ones.
    fn matches(&self, url: &Url) -> bool;

    /// Fetch the page behind the URL
    ///
    /// Called only if `matches()` returned true.
    async fn fetch(&self, url: &Url, options: &FetchOptions) -> Result<FetchedPage, EnrichError>;
}

/// Registry of fetchers that dispatches to the appropriate handler
pub struct FetcherRegistry {
    fetchers: Vec<Box<dyn Fetcher>>,
}

impl Default for FetcherRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FetcherRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            fetchers: Vec::new(),
        }
    }

    /// Create a registry with the HTML fetcher registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(HtmlFetcher::new()));
        registry
    }

    /// Register a fetcher
    ///
    /// Fetchers are checked in registration order.
    pub fn register(&mut self, fetcher: Box<dyn Fetcher>) {
        self.fetchers.push(fetcher);
    }

    /// Fetch a URL using the first matching fetcher
    ///
    /// Scheme and prefix checks run before any network call.
    pub async fn fetch(&self, url: &Url, options: &FetchOptions) -> Result<FetchedPage, EnrichError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(EnrichError::InvalidUrlScheme);
        }

        let raw = url.as_str();
        if !options.allow_prefixes.is_empty()
            && !options
                .allow_prefixes
                .iter()
                .any(|prefix| raw.starts_with(prefix))
        {
            return Err(EnrichError::BlockedUrl);
        }

        if options
            .block_prefixes
            .iter()
            .any(|prefix| raw.starts_with(prefix))
        {
            return Err(EnrichError::BlockedUrl);
        }

        for fetcher in &self.fetchers {
            if fetcher.matches(url) {
                tracing::debug!(fetcher = fetcher.name(), url = %url, "Using fetcher");
                return fetcher.fetch(url, options).await;
            }
        }

        Err(EnrichError::FetcherError(
            "No fetcher available for URL".to_string(),
        ))
    }
}
