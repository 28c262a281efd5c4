//! Core types for LinkKit

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// Request to enrich a URL
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct EnrichRequest {
    /// The URL to enrich (required, must be http:// or https://)
    pub url: String,

    /// Store the result after enrichment (optional, default true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persist: Option<bool>,
}

impl EnrichRequest {
    /// Create a new request with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Enrich without storing the result
    pub fn preview(mut self) -> Self {
        self.persist = Some(false);
        self
    }

    /// Check if the caller wants the result stored
    pub fn wants_persist(&self) -> bool {
        self.persist.unwrap_or(true)
    }
}

/// Result of one enrichment run
///
/// `title` is never empty and `categories` always has at least one entry.
/// `summary` may hold a placeholder when the completion call failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnrichedLink {
    /// The URL as submitted
    pub source_url: String,

    /// Resolved page title
    pub title: String,

    /// Normalized readable text used for summarization
    pub body_text: String,

    /// Bullet-point summary
    pub summary: String,

    /// Category labels
    pub categories: Vec<String>,
}

/// Raw HTML page returned by a fetcher
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: Url,

    /// HTTP status code
    pub status_code: u16,

    /// Content-Type header value
    pub content_type: String,

    /// Decoded response body
    pub html: String,

    /// True if the body exceeded the size cap and was cut
    pub truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_persist_default() {
        let req = EnrichRequest::new("https://example.com");
        assert_eq!(req.url, "https://example.com");
        assert!(req.persist.is_none());
        assert!(req.wants_persist());

        let req = req.preview();
        assert_eq!(req.persist, Some(false));
        assert!(!req.wants_persist());
    }

    #[test]
    fn test_request_deserialize_minimal() {
        let req: EnrichRequest = serde_json::from_str(r#"{"url":"https://example.com"}"#).unwrap();
        assert_eq!(req.url, "https://example.com");
        assert!(req.wants_persist());
    }

    #[test]
    fn test_request_serialization_omits_unset() {
        let json = serde_json::to_string(&EnrichRequest::new("https://example.com")).unwrap();
        assert_eq!(json, r#"{"url":"https://example.com"}"#);
    }

    #[test]
    fn test_enriched_link_serialization() {
        let link = EnrichedLink {
            source_url: "https://example.com".to_string(),
            title: "Example".to_string(),
            body_text: "Body.".to_string(),
            summary: "- point".to_string(),
            categories: vec!["Technology".to_string()],
        };
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["source_url"], "https://example.com");
        assert_eq!(json["categories"][0], "Technology");
    }
}
