//! Searching, filtering and paging a user's saved links

use crate::store::SavedLink;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Default page size
pub const DEFAULT_PER_PAGE: usize = 10;

/// Sort order for library listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most recently saved first
    #[default]
    Newest,
    /// Oldest first
    Oldest,
    /// Alphabetical by title
    Title,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            "title" => Ok(SortOrder::Title),
            _ => Err("Invalid sort: must be newest, oldest or title".to_string()),
        }
    }
}

/// Library query
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LinkQuery {
    /// Case-insensitive text matched against title, URL and summary
    #[serde(default)]
    pub search: String,

    /// Keep links carrying any of these categories; empty or `["all"]` keeps everything
    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub sort: SortOrder,

    /// 1-based page number
    #[serde(default = "first_page")]
    pub page: usize,

    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

fn first_page() -> usize {
    1
}

fn default_per_page() -> usize {
    DEFAULT_PER_PAGE
}

impl Default for LinkQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            categories: Vec::new(),
            sort: SortOrder::default(),
            page: first_page(),
            per_page: default_per_page(),
        }
    }
}

/// One page of query results
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LinkPage {
    pub items: Vec<SavedLink>,
    /// Matching links across all pages
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

impl LinkQuery {
    fn matches_search(&self, link: &SavedLink) -> bool {
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || link.title.to_lowercase().contains(&needle)
            || link.url.to_lowercase().contains(&needle)
            || link.summary.to_lowercase().contains(&needle)
    }

    fn matches_categories(&self, link: &SavedLink) -> bool {
        match self.categories.first() {
            None => true,
            Some(first) if first == "all" => true,
            Some(_) => self
                .categories
                .iter()
                .any(|wanted| link.categories.contains(wanted)),
        }
    }
}

/// Filter, sort and paginate `links`
pub fn query_links(links: &[SavedLink], query: &LinkQuery) -> LinkPage {
    let mut matched: Vec<&SavedLink> = links
        .iter()
        .filter(|l| query.matches_search(l) && query.matches_categories(l))
        .collect();

    match query.sort {
        SortOrder::Newest => matched.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::Oldest => matched.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOrder::Title => {
            matched.sort_by_cached_key(|l| l.title.to_lowercase());
        }
    }

    let per_page = query.per_page.max(1);
    let page = query.page.max(1);
    let total = matched.len();

    let items = matched
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .cloned()
        .collect();

    LinkPage {
        items,
        total,
        page,
        total_pages: total.div_ceil(per_page),
    }
}

/// Distinct categories across `links`, sorted
pub fn available_categories(links: &[SavedLink]) -> Vec<String> {
    links
        .iter()
        .flat_map(|l| l.categories.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LinkOrigin;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn saved(title: &str, url: &str, summary: &str, categories: &[&str], age_days: i64) -> SavedLink {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        SavedLink {
            id: Uuid::new_v4(),
            owner: "alice".to_string(),
            url: url.to_string(),
            title: title.to_string(),
            summary: summary.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            origin: LinkOrigin::Web,
            created_at: base - Duration::days(age_days),
        }
    }

    fn library() -> Vec<SavedLink> {
        vec![
            saved("Rust 2024", "https://blog.rust-lang.org", "- Editions", &["Technology"], 3),
            saved("banana bread", "https://recipes.example.com", "- Baking", &["Other"], 1),
            saved("Markets rally", "https://news.example.com/markets", "- Stocks up", &["Business", "News"], 2),
        ]
    }

    fn titles(page: &LinkPage) -> Vec<&str> {
        page.items.iter().map(|l| l.title.as_str()).collect()
    }

    #[test]
    fn test_default_query_newest_first() {
        let page = query_links(&library(), &LinkQuery::default());
        assert_eq!(titles(&page), vec!["banana bread", "Markets rally", "Rust 2024"]);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_sort_orders() {
        let links = library();
        let query = LinkQuery {
            sort: SortOrder::Oldest,
            ..Default::default()
        };
        assert_eq!(titles(&query_links(&links, &query)), vec!["Rust 2024", "Markets rally", "banana bread"]);

        let query = LinkQuery {
            sort: SortOrder::Title,
            ..Default::default()
        };
        assert_eq!(titles(&query_links(&links, &query)), vec!["banana bread", "Markets rally", "Rust 2024"]);
    }

    #[test]
    fn test_search_matches_title_url_and_summary() {
        let links = library();
        let search = |s: &str| {
            let query = LinkQuery {
                search: s.to_string(),
                ..Default::default()
            };
            titles(&query_links(&links, &query)).into_iter().map(str::to_string).collect::<Vec<_>>()
        };

        assert_eq!(search("RUST"), vec!["Rust 2024"]);
        assert_eq!(search("recipes.example"), vec!["banana bread"]);
        assert_eq!(search("stocks"), vec!["Markets rally"]);
        assert!(search("nothing-like-this").is_empty());
    }

    #[test]
    fn test_category_filter() {
        let links = library();
        let query = LinkQuery {
            categories: vec!["News".to_string(), "Technology".to_string()],
            ..Default::default()
        };
        assert_eq!(titles(&query_links(&links, &query)), vec!["Markets rally", "Rust 2024"]);

        let query = LinkQuery {
            categories: vec!["all".to_string()],
            ..Default::default()
        };
        assert_eq!(query_links(&links, &query).total, 3);
    }

    #[test]
    fn test_pagination() {
        let links = library();
        let query = LinkQuery {
            per_page: 2,
            page: 2,
            ..Default::default()
        };
        let page = query_links(&links, &query);
        assert_eq!(titles(&page), vec!["Rust 2024"]);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);

        let query = LinkQuery {
            per_page: 2,
            page: 5,
            ..Default::default()
        };
        assert!(query_links(&links, &query).items.is_empty());
    }

    #[test]
    fn test_huge_page_number_is_empty() {
        let query: LinkQuery = serde_json::from_str(r#"{"page":18446744073709551615}"#).unwrap();
        assert_eq!(query.page, usize::MAX);

        let page = query_links(&library(), &query);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
        assert_eq!(page.page, usize::MAX);

        let query = LinkQuery {
            page: usize::MAX,
            per_page: usize::MAX,
            ..Default::default()
        };
        assert!(query_links(&[], &query).items.is_empty());
    }

    #[test]
    fn test_available_categories() {
        assert_eq!(
            available_categories(&library()),
            vec!["Business", "News", "Other", "Technology"]
        );
    }

    #[test]
    fn test_sort_order_from_str() {
        assert_eq!("newest".parse::<SortOrder>().unwrap(), SortOrder::Newest);
        assert_eq!("Oldest".parse::<SortOrder>().unwrap(), SortOrder::Oldest);
        assert_eq!("TITLE".parse::<SortOrder>().unwrap(), SortOrder::Title);
        assert!("random".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_query_deserialize_defaults() {
        let query: LinkQuery = serde_json::from_str(r#"{"search":"rust"}"#).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, DEFAULT_PER_PAGE);
        assert_eq!(query.sort, SortOrder::Newest);
    }
}
