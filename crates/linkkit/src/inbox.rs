//! Saving links from inbound email
//!
//! Every http(s) URL in the email body is enriched and stored on its own.
//! A failure for one URL is reported in that URL's result and does not
//! affect the others.

use crate::pipeline::Enricher;
use crate::store::{LinkOrigin, LinkStore, SavedLink};
use crate::types::EnrichRequest;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Characters stripped from the end of a URL found in prose
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '>', '"', '\''];

/// Inbound email payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEmail {
    pub from: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub text: String,
}

/// Per-URL result of processing an email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxResult {
    pub url: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<SavedLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Find http(s) URLs in free text, in order of appearance
pub fn extract_urls(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter_map(|token| {
            let start = ["http://", "https://"]
                .iter()
                .filter_map(|scheme| token.find(scheme))
                .min()?;
            let url = token[start..].trim_end_matches(TRAILING_PUNCTUATION);
            let has_host = url
                .split_once("://")
                .is_some_and(|(_, rest)| !rest.is_empty());
            has_host.then(|| url.to_string())
        })
        .collect()
}

/// Enrich and store every URL found in `email` for `owner`
pub async fn process_email(
    enricher: &Enricher,
    email: &InboundEmail,
    owner: &str,
    store: &dyn LinkStore,
) -> Vec<InboxResult> {
    let urls = extract_urls(&email.text);
    info!(from = %email.from, urls = urls.len(), "Processing inbound email");

    let runs = urls.into_iter().map(|url| async move {
        let origin = LinkOrigin::Email {
            subject: email.subject.clone(),
        };
        let result = enricher
            .save(EnrichRequest::new(url.clone()), owner, store, origin)
            .await;

        match result {
            Ok(saved) => InboxResult {
                url,
                success: true,
                link: Some(saved),
                error: None,
            },
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to save link from email");
                InboxResult {
                    url,
                    success: false,
                    link: None,
                    error: Some(e.to_string()),
                }
            }
        }
    });

    join_all(runs).await
}
