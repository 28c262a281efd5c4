//! Enrichment stages that run after extraction
//!
//! Summarization and categorization are best-effort: a failed completion
//! call is recorded as [`StageOutcome::Degraded`] with a placeholder value,
//! so these stages cannot fail a pipeline run.

mod categorize;
mod summarize;

pub use categorize::{Categorizer, DEFAULT_CATEGORIES, FALLBACK_CATEGORY};
pub use summarize::{Summarizer, NO_SUMMARY_PLACEHOLDER, SUMMARY_FAILED_PLACEHOLDER};

/// Result of a best-effort stage
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    /// Stage produced a real value
    Ok(T),
    /// Stage fell back to a placeholder
    Degraded { value: T, cause: String },
}

impl<T> StageOutcome<T> {
    /// The value, real or placeholder
    pub fn value(&self) -> &T {
        match self {
            StageOutcome::Ok(value) | StageOutcome::Degraded { value, .. } => value,
        }
    }

    /// Consume and return the value
    pub fn into_value(self) -> T {
        match self {
            StageOutcome::Ok(value) | StageOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, StageOutcome::Degraded { .. })
    }

    /// Why the stage degraded, if it did
    pub fn cause(&self) -> Option<&str> {
        match self {
            StageOutcome::Ok(_) => None,
            StageOutcome::Degraded { cause, .. } => Some(cause),
        }
    }
}

/// First `max_chars` characters of `text`
pub(crate) fn head_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
