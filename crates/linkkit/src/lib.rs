//! LinkKit - link enrichment for read-later libraries
//!
//! Given a URL, LinkKit fetches the page, extracts its title and readable
//! text, and asks a language model for a short bullet summary and a few
//! category labels. The result is one [`EnrichedLink`].
//!
//! ## Pipeline
//!
//! [`Enricher`] runs `validate → fetch → extract → {summarize, categorize}`.
//! Fetch and extract failures abort the run with an [`EnrichError`] whose
//! message is safe to show to users. Summarization and categorization are
//! best-effort and fall back to placeholders (see [`stages`]).
//!
//! ## Collaborators
//!
//! - [`CompletionModel`] - text generation, implemented by [`OpenAiClient`]
//! - [`Fetcher`] - page retrieval, implemented by [`HtmlFetcher`]
//! - [`LinkStore`] - persistence, implemented by [`MemoryStore`] and [`JsonFileStore`]

pub mod client;
pub mod completion;
mod error;
pub mod extract;
pub mod fetchers;
pub mod inbox;
pub mod library;
mod pipeline;
pub mod stages;
pub mod store;
#[cfg(test)]
mod testing;
mod types;

pub use client::{fetch_page, fetch_page_with_options, parse_http_url, FetchOptions};
pub use completion::{CompletionError, CompletionModel, OpenAiClient, OpenAiConfig};
pub use error::{EnrichError, NetworkFailure};
pub use extract::{extract_content, ExtractedContent};
pub use fetchers::{Fetcher, FetcherRegistry, HtmlFetcher};
pub use inbox::{extract_urls, process_email, InboundEmail, InboxResult};
pub use library::{available_categories, query_links, LinkPage, LinkQuery, SortOrder};
pub use pipeline::{EnrichStatus, Enricher, EnricherBuilder, Submission};
pub use stages::StageOutcome;
pub use store::{JsonFileStore, LinkOrigin, LinkStore, MemoryStore, SavedLink, StoreError};
pub use types::{EnrichRequest, EnrichedLink, FetchedPage};

/// Default User-Agent string
///
/// A desktop browser string; some sites refuse obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// JSON schema of a request or response type
pub fn schema_of<T: schemars::JsonSchema>() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or_default()
}
