//! Enrichment pipeline and its builder
//!
//! One run is `validate → fetch → extract → {summarize, categorize} → merge`.
//! Fetch and extract failures abort the run; the two completion stages
//! degrade to placeholders instead.

use crate::client::{parse_http_url, FetchOptions};
use crate::completion::{CompletionModel, OpenAiClient};
use crate::error::EnrichError;
use crate::extract::extract_content;
use crate::fetchers::{Fetcher, FetcherRegistry};
use crate::stages::{Categorizer, Summarizer};
use crate::store::{LinkOrigin, LinkStore, SavedLink};
use crate::types::{EnrichRequest, EnrichedLink};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Status update during a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichStatus {
    /// Current phase ("validate", "fetch", "extract", "enrich", "complete")
    pub phase: String,
    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Estimated completion percentage (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_complete: Option<f32>,
}

impl EnrichStatus {
    /// Create a new status with phase
    pub fn new(phase: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            message: None,
            percent_complete: None,
        }
    }

    /// Set message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set completion percentage
    pub fn with_percent(mut self, percent: f32) -> Self {
        self.percent_complete = Some(percent);
        self
    }
}

/// Outcome of [`Enricher::submit`]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "link", rename_all = "lowercase")]
pub enum Submission {
    /// Enriched and stored
    Saved(SavedLink),
    /// Enriched only; the request asked not to persist
    Preview(EnrichedLink),
}

/// Builder for configuring an [`Enricher`]
pub struct EnricherBuilder {
    model: Arc<dyn CompletionModel>,
    options: FetchOptions,
    registry: Option<FetcherRegistry>,
}

impl EnricherBuilder {
    /// Start a builder around a completion model
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self {
            model,
            options: FetchOptions::default(),
            registry: None,
        }
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.options.user_agent = Some(ua.into());
        self
    }

    /// Add URL prefix to allow list
    pub fn allow_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.allow_prefixes.push(prefix.into());
        self
    }

    /// Add URL prefix to block list
    pub fn block_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.block_prefixes.push(prefix.into());
        self
    }

    /// Set the page fetch timeout
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Set the body size cap
    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.options.max_body_bytes = bytes;
        self
    }

    /// Register an extra fetcher ahead of the default HTML fetcher
    pub fn fetcher(mut self, fetcher: Box<dyn Fetcher>) -> Self {
        self.registry
            .get_or_insert_with(FetcherRegistry::new)
            .register(fetcher);
        self
    }

    /// Build the enricher
    pub fn build(self) -> Enricher {
        let registry = match self.registry {
            Some(mut custom) => {
                custom.register(Box::new(crate::fetchers::HtmlFetcher::new()));
                custom
            }
            None => FetcherRegistry::with_defaults(),
        };

        Enricher {
            registry: Arc::new(registry),
            options: self.options,
            summarizer: Summarizer::new(self.model.clone()),
            categorizer: Categorizer::new(self.model),
        }
    }
}

/// Configured enrichment pipeline
///
/// Cheap to clone; runs share nothing but the configuration.
#[derive(Clone)]
pub struct Enricher {
    registry: Arc<FetcherRegistry>,
    options: FetchOptions,
    summarizer: Summarizer,
    categorizer: Categorizer,
}

impl Enricher {
    /// Create a new builder
    pub fn builder(model: Arc<dyn CompletionModel>) -> EnricherBuilder {
        EnricherBuilder::new(model)
    }

    /// Enricher backed by the OpenAI client configured from the environment
    pub fn from_env() -> Result<Self, EnrichError> {
        let client =
            OpenAiClient::from_env().map_err(|e| EnrichError::Configuration(e.to_string()))?;
        Ok(Self::builder(Arc::new(client)).build())
    }

    /// Fetch options in effect
    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Get input schema as JSON
    pub fn input_schema(&self) -> serde_json::Value {
        crate::schema_of::<EnrichRequest>()
    }

    /// Get output schema as JSON
    pub fn output_schema(&self) -> serde_json::Value {
        crate::schema_of::<EnrichedLink>()
    }

    /// Run the pipeline for one URL
    pub async fn enrich(&self, req: EnrichRequest) -> Result<EnrichedLink, EnrichError> {
        self.enrich_with_status(req, |_| {}).await
    }

    /// Run the pipeline for one URL with status updates
    pub async fn enrich_with_status<F>(
        &self,
        req: EnrichRequest,
        mut status_callback: F,
    ) -> Result<EnrichedLink, EnrichError>
    where
        F: FnMut(EnrichStatus),
    {
        status_callback(EnrichStatus::new("validate").with_percent(0.0));
        let url = parse_http_url(&req.url)?;

        status_callback(EnrichStatus::new("fetch").with_percent(10.0));
        let page = self.registry.fetch(&url, &self.options).await?;

        status_callback(EnrichStatus::new("extract").with_percent(40.0));
        let content = extract_content(&page.html, &page.url)?;
        debug!(
            url = %page.url,
            title = %content.title,
            chars = content.body_text.chars().count(),
            "Extracted content"
        );

        status_callback(EnrichStatus::new("enrich").with_percent(60.0));
        let (summary, categories) = tokio::join!(
            self.summarizer.summarize(&content.body_text),
            self.categorizer.categorize(&content.body_text)
        );

        if let Some(cause) = summary.cause() {
            warn!(url = %url, cause, "Summary degraded");
        }
        if let Some(cause) = categories.cause() {
            warn!(url = %url, cause, "Categories degraded");
        }

        status_callback(EnrichStatus::new("complete").with_percent(100.0));

        Ok(EnrichedLink {
            source_url: req.url,
            title: content.title,
            body_text: content.body_text,
            summary: summary.into_value(),
            categories: categories.into_value(),
        })
    }

    /// Enrich a URL and store it for `owner` unless the request is a preview
    pub async fn submit(
        &self,
        req: EnrichRequest,
        owner: &str,
        store: &dyn LinkStore,
    ) -> Result<Submission, EnrichError> {
        if !req.wants_persist() {
            return self.enrich(req).await.map(Submission::Preview);
        }
        self.save(req, owner, store, LinkOrigin::Web)
            .await
            .map(Submission::Saved)
    }

    /// Enrich a URL and store it, whatever the request's persist flag says
    pub(crate) async fn save(
        &self,
        req: EnrichRequest,
        owner: &str,
        store: &dyn LinkStore,
        origin: LinkOrigin,
    ) -> Result<SavedLink, EnrichError> {
        let link = self.enrich(req).await?;
        let saved = store
            .insert(owner, &link, origin)
            .await
            .map_err(EnrichError::Store)?;
        info!(id = %saved.id, url = %saved.url, "Saved link");
        Ok(saved)
    }
}
