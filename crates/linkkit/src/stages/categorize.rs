//! Category labelling

use super::{head_chars, StageOutcome};
use crate::completion::{CompletionModel, CompletionRequest};
use std::sync::Arc;

/// Labels suggested to the model
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Technology",
    "Business",
    "Science",
    "Health",
    "Education",
    "Entertainment",
    "News",
    "Other",
];

/// Used when categorization fails or yields nothing
pub const FALLBACK_CATEGORY: &str = "Other";

/// Characters of body text sent to the model
const CATEGORY_INPUT_CHARS: usize = 1000;

const MAX_CATEGORIES: usize = 3;
const CATEGORY_TEMPERATURE: f32 = 0.3;
const CATEGORY_MAX_TOKENS: u32 = 50;

/// Assigns one to three category labels to extracted text
#[derive(Clone)]
pub struct Categorizer {
    model: Arc<dyn CompletionModel>,
}

impl Categorizer {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    /// Categorize `text`; never fails and never returns an empty list
    pub async fn categorize(&self, text: &str) -> StageOutcome<Vec<String>> {
        let prompt = format!(
            "Categorize this content into 1-3 of these categories: {}. Return only the category names separated by commas:\n\n{}",
            DEFAULT_CATEGORIES.join(", "),
            head_chars(text, CATEGORY_INPUT_CHARS)
        );
        let request = CompletionRequest::prompt(prompt, CATEGORY_TEMPERATURE, CATEGORY_MAX_TOKENS);

        match self.model.complete(request).await {
            Ok(answer) => {
                let labels = parse_categories(&answer);
                if labels.is_empty() {
                    fallback(format!("no labels in completion {answer:?}"))
                } else {
                    StageOutcome::Ok(labels)
                }
            }
            Err(e) => fallback(e.to_string()),
        }
    }
}

fn fallback(cause: String) -> StageOutcome<Vec<String>> {
    StageOutcome::Degraded {
        value: vec![FALLBACK_CATEGORY.to_string()],
        cause,
    }
}

/// Split a comma-separated answer into labels
///
/// Labels matching a suggested category case-insensitively take its spelling.
/// Unknown labels are kept as-is.
pub(crate) fn parse_categories(answer: &str) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();

    for raw in answer.split(',') {
        let label = raw.trim().trim_end_matches('.').trim();
        if label.is_empty() {
            continue;
        }

        let label = DEFAULT_CATEGORIES
            .iter()
            .find(|known| known.eq_ignore_ascii_case(label))
            .map(|known| known.to_string())
            .unwrap_or_else(|| label.to_string());

        if !labels.contains(&label) {
            labels.push(label);
        }
        if labels.len() == MAX_CATEGORIES {
            break;
        }
    }

    labels
}
