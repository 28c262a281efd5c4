//! Error types for LinkKit
//!
//! Fetch and extract failures abort a pipeline run and carry a message that
//! can be shown to the user as-is. Completion failures never abort a run; they
//! are converted into degraded stage outcomes (see [`crate::stages`]).

use std::io;
use thiserror::Error;

/// Errors that abort an enrichment run
#[derive(Debug, Error)]
pub enum EnrichError {
    /// URL is missing
    #[error("Missing required parameter: url")]
    MissingUrl,

    /// URL is not an absolute http(s) URL
    #[error("Invalid URL: must start with http:// or https://")]
    InvalidUrlScheme,

    /// URL is blocked by prefix list
    #[error("Blocked URL: prefix not allowed")]
    BlockedUrl,

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// The site did not answer within the fetch timeout
    #[error("Request timed out. The website might be too slow to respond.")]
    FetchTimeout,

    /// Classified network failure
    #[error("{0}")]
    Network(NetworkFailure),

    /// Any other request failure
    #[error("Failed to extract content: {0}")]
    RequestError(String),

    /// Non-2xx response
    #[error("Failed to fetch URL: {status} {status_text}")]
    FetchHttpError { status: u16, status_text: String },

    /// Response is not an HTML document
    #[error("URL does not point to a webpage. Only HTML pages are supported.")]
    UnsupportedContentType(String),

    /// Extraction found nothing to summarize
    #[error("No readable content found on the page.")]
    NoReadableContent,

    /// Fetcher-specific error
    #[error("Fetcher error: {0}")]
    FetcherError(String),

    /// Pipeline could not be configured
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Enriched link could not be stored
    #[error("Failed to save link")]
    Store(#[source] crate::store::StoreError),
}

/// Network failures with a dedicated user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NetworkFailure {
    /// Host name did not resolve
    #[error("Could not find the website. Please check the URL and try again.")]
    DnsLookup,

    /// Nothing is listening on the target address
    #[error("Could not connect to the website. The server might be down.")]
    ConnectionRefused,

    /// TLS handshake rejected the server certificate
    #[error("The website has an invalid security certificate.")]
    InvalidCertificate,
}

impl NetworkFailure {
    /// Classify a lowercased error message
    pub(crate) fn from_message(message: &str) -> Option<Self> {
        const DNS_MARKERS: &[&str] = &[
            "dns error",
            "failed to lookup address",
            "name or service not known",
            "no such host",
            "nodename nor servname",
            "enotfound",
        ];

        if DNS_MARKERS.iter().any(|m| message.contains(m)) {
            Some(NetworkFailure::DnsLookup)
        } else if message.contains("connection refused") || message.contains("econnrefused") {
            Some(NetworkFailure::ConnectionRefused)
        } else if message.contains("certificate") {
            Some(NetworkFailure::InvalidCertificate)
        } else {
            None
        }
    }
}

impl EnrichError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return EnrichError::FetchTimeout;
        }

        let mut messages = vec![err.to_string()];
        let mut refused = false;
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            if let Some(io_err) = cause.downcast_ref::<io::Error>() {
                if io_err.kind() == io::ErrorKind::ConnectionRefused {
                    refused = true;
                }
            }
            messages.push(cause.to_string());
            source = cause.source();
        }

        if refused {
            return EnrichError::Network(NetworkFailure::ConnectionRefused);
        }

        let chain = messages.join(": ");
        match NetworkFailure::from_message(&chain.to_lowercase()) {
            Some(failure) => EnrichError::Network(failure),
            None => EnrichError::RequestError(chain),
        }
    }
}
