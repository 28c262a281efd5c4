//! Bullet-point summarization

use super::{head_chars, StageOutcome};
use crate::completion::{CompletionModel, CompletionRequest};
use std::sync::Arc;

/// Returned when the completion call fails
pub const SUMMARY_FAILED_PLACEHOLDER: &str = "Failed to generate summary";

/// Returned when the model answers with no text
pub const NO_SUMMARY_PLACEHOLDER: &str = "No summary available";

/// Characters of body text sent to the model
const SUMMARY_INPUT_CHARS: usize = 3000;

const SUMMARY_TEMPERATURE: f32 = 0.7;
const SUMMARY_MAX_TOKENS: u32 = 250;

/// Summarizes extracted text into a few bullet points
#[derive(Clone)]
pub struct Summarizer {
    model: Arc<dyn CompletionModel>,
}

impl Summarizer {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    /// Summarize `text`; never fails
    pub async fn summarize(&self, text: &str) -> StageOutcome<String> {
        let prompt = format!(
            "Summarize the following content in 3-5 bullet points, focusing on the main ideas:\n\n{}",
            head_chars(text, SUMMARY_INPUT_CHARS)
        );
        let request = CompletionRequest::prompt(prompt, SUMMARY_TEMPERATURE, SUMMARY_MAX_TOKENS);

        match self.model.complete(request).await {
            Ok(summary) if !summary.trim().is_empty() => StageOutcome::Ok(summary.trim().to_string()),
            Ok(_) => StageOutcome::Degraded {
                value: NO_SUMMARY_PLACEHOLDER.to_string(),
                cause: "empty completion".to_string(),
            },
            Err(e) => StageOutcome::Degraded {
                value: SUMMARY_FAILED_PLACEHOLDER.to_string(),
                cause: e.to_string(),
            },
        }
    }
}
