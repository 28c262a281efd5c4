//! Test doubles for the completion and fetch seams

use crate::client::FetchOptions;
use crate::completion::{CompletionError, CompletionModel, CompletionRequest};
use crate::error::EnrichError;
use crate::fetchers::Fetcher;
use crate::types::FetchedPage;
use async_trait::async_trait;
use std::sync::Mutex;
use url::Url;

/// Completion model returning a canned answer and recording requests
pub struct StubModel {
    answer: Option<String>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl StubModel {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn last_prompt(&self) -> String {
        let requests = self.requests.lock().unwrap();
        requests.last().unwrap().messages[0].content.clone()
    }
}

#[async_trait]
impl CompletionModel for StubModel {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(request);
        match &self.answer {
            Some(answer) => Ok(answer.clone()),
            None => Err(CompletionError::Status {
                status: 500,
                body: "upstream exploded".to_string(),
            }),
        }
    }
}

/// Fetcher serving the same HTML for every URL, without network access
pub struct CannedFetcher {
    html: String,
}

impl CannedFetcher {
    pub fn serving(html: &str) -> Self {
        Self {
            html: html.to_string(),
        }
    }
}

#[async_trait]
impl Fetcher for CannedFetcher {
    fn name(&self) -> &'static str {
        "canned"
    }

    fn matches(&self, _url: &Url) -> bool {
        true
    }

    async fn fetch(&self, url: &Url, _options: &FetchOptions) -> Result<FetchedPage, EnrichError> {
        Ok(FetchedPage {
            url: url.clone(),
            status_code: 200,
            content_type: "text/html".to_string(),
            html: self.html.clone(),
            truncated: false,
        })
    }
}
