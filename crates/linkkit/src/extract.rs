//! Readable content extraction
//!
//! Turns a fetched HTML document into a `(title, body_text)` pair. Title and
//! body are each resolved by an ordered list of strategies; the first one that
//! yields non-empty text wins.
//!
//! Boilerplate elements (scripts, navigation, headers, footers, asides and
//! anything marked `role="complementary"`) are invisible to every strategy,
//! including their descendants.

use crate::error::EnrichError;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

/// Maximum length of extracted body text, in characters
pub const MAX_BODY_CHARS: usize = 5000;

/// Elements whose subtree never contributes text
const SKIP_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "nav", "footer", "header", "aside",
];

/// Meta tags tried for the page description, in order
const DESCRIPTION_SELECTORS: &[&str] = &[
    r#"meta[name="description"]"#,
    r#"meta[property="og:description"]"#,
    r#"meta[name="twitter:description"]"#,
];

/// Main content containers, in order of preference
const MAIN_CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    r#"[role="main"]"#,
    ".content",
    "#content",
    ".main",
];

type Strategy = fn(&Html) -> Option<String>;

/// Title strategies, tried before the host name fallback
const TITLE_STRATEGIES: &[Strategy] = &[og_title, twitter_title, document_title, first_heading];

/// Body text strategies
const BODY_STRATEGIES: &[Strategy] = &[meta_description, main_content, paragraphs, body_text];

/// Title and readable text extracted from a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    /// Page title, never empty
    pub title: String,
    /// Normalized body text, at most [`MAX_BODY_CHARS`] characters
    pub body_text: String,
}

/// Extract title and body text from an HTML document
///
/// `base_url` is the resolved page URL; its host name is the last title
/// fallback.
pub fn extract_content(html: &str, base_url: &Url) -> Result<ExtractedContent, EnrichError> {
    let document = Html::parse_document(html);

    let title = resolve_title(&document, base_url);

    let body_text = BODY_STRATEGIES
        .iter()
        .find_map(|strategy| non_empty(strategy(&document)))
        .ok_or(EnrichError::NoReadableContent)?;

    Ok(ExtractedContent {
        title,
        body_text: truncate_at_sentence(&body_text, MAX_BODY_CHARS),
    })
}

/// Resolve the page title, falling back to the URL host name
pub fn resolve_title(document: &Html, base_url: &Url) -> String {
    TITLE_STRATEGIES
        .iter()
        .find_map(|strategy| non_empty(strategy(document)))
        .unwrap_or_else(|| match base_url.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => base_url.as_str().to_string(),
        })
}

/// Collapse whitespace runs to single spaces and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cap `text` at `max_chars` characters, preferring a sentence boundary
///
/// When the text is too long, the first `max_chars` characters are kept and
/// then cut right after the last `.` in that window. Without a `.` past the
/// first character the hard cut stands.
pub fn truncate_at_sentence(text: &str, max_chars: usize) -> String {
    let cut = match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => byte_idx,
        None => return text.to_string(),
    };

    let window = &text[..cut];
    match window.rfind('.') {
        Some(period) if period > 0 => window[..=period].to_string(),
        _ => window.to_string(),
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.map(|t| normalize_whitespace(&t)).filter(|t| !t.is_empty())
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn is_skipped(element: ElementRef<'_>) -> bool {
    let el = element.value();
    SKIP_TAGS.contains(&el.name()) || el.attr("role") == Some("complementary")
}

/// True if the element or any ancestor is boilerplate
fn is_hidden(element: ElementRef<'_>) -> bool {
    is_skipped(element) || element.ancestors().filter_map(ElementRef::wrap).any(is_skipped)
}

/// Elements matching `css` that are not inside boilerplate
fn visible<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match selector(css) {
        Some(sel) => document.select(&sel).filter(|el| !is_hidden(*el)).collect(),
        None => Vec::new(),
    }
}

/// Concatenated text of an element, skipping boilerplate subtrees
fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    if is_skipped(element) {
        return;
    }
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

fn meta_content(document: &Html, css: &str) -> Option<String> {
    visible(document, css)
        .into_iter()
        .find_map(|el| el.value().attr("content").map(str::to_string))
}

fn og_title(document: &Html) -> Option<String> {
    meta_content(document, r#"meta[property="og:title"]"#)
}

fn twitter_title(document: &Html) -> Option<String> {
    meta_content(document, r#"meta[name="twitter:title"]"#)
}

fn document_title(document: &Html) -> Option<String> {
    visible(document, "title").into_iter().next().map(visible_text)
}

fn first_heading(document: &Html) -> Option<String> {
    visible(document, "h1").into_iter().next().map(visible_text)
}

fn meta_description(document: &Html) -> Option<String> {
    DESCRIPTION_SELECTORS
        .iter()
        .find_map(|css| non_empty(meta_content(document, css)))
}

fn main_content(document: &Html) -> Option<String> {
    MAIN_CONTENT_SELECTORS.iter().find_map(|css| {
        visible(document, css)
            .into_iter()
            .next()
            .and_then(|el| non_empty(Some(visible_text(el))))
    })
}

fn paragraphs(document: &Html) -> Option<String> {
    let text = visible(document, "p")
        .into_iter()
        .map(|el| visible_text(el).trim().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    Some(text)
}

fn body_text(document: &Html) -> Option<String> {
    match visible(document, "body").into_iter().next() {
        Some(body) => Some(visible_text(body)),
        None => Some(visible_text(document.root_element())),
    }
}
