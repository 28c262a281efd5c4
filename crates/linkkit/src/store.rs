//! Storage seam for enriched links
//!
//! The pipeline hands finished records to a [`LinkStore`] together with the
//! owner's identity. [`MemoryStore`] keeps them in process, [`JsonFileStore`]
//! keeps them in a JSON file; other deployments plug in their own backend.

use crate::types::EnrichedLink;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Errors from a link store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend rejected or failed the operation
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Store file could not be read or written
    #[error("Store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Store file is not a JSON list of saved links
    #[error("Store file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// How a link entered the library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LinkOrigin {
    /// Submitted directly
    Web,
    /// Found in an inbound email
    Email { subject: Option<String> },
}

/// A stored link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SavedLink {
    pub id: Uuid,
    pub owner: String,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub categories: Vec<String>,
    pub origin: LinkOrigin,
    pub created_at: DateTime<Utc>,
}

impl SavedLink {
    /// Build a new row for `owner`
    pub fn new(owner: &str, link: &EnrichedLink, origin: LinkOrigin) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            url: link.source_url.clone(),
            title: link.title.clone(),
            summary: link.summary.clone(),
            categories: link.categories.clone(),
            origin,
            created_at: Utc::now(),
        }
    }
}

/// Persistence collaborator for enriched links
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Store a link for `owner`
    async fn insert(
        &self,
        owner: &str,
        link: &EnrichedLink,
        origin: LinkOrigin,
    ) -> Result<SavedLink, StoreError>;

    /// All links of `owner`, newest first
    async fn list(&self, owner: &str) -> Result<Vec<SavedLink>, StoreError>;

    /// Delete one of `owner`'s links; returns false if it was not theirs or not found
    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool, StoreError>;
}

/// In-process link store
#[derive(Debug, Default)]
pub struct MemoryStore {
    links: RwLock<Vec<SavedLink>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn insert(
        &self,
        owner: &str,
        link: &EnrichedLink,
        origin: LinkOrigin,
    ) -> Result<SavedLink, StoreError> {
        let saved = SavedLink::new(owner, link, origin);
        self.links.write().await.push(saved.clone());
        Ok(saved)
    }

    async fn list(&self, owner: &str) -> Result<Vec<SavedLink>, StoreError> {
        Ok(owned_newest_first(&self.links.read().await, owner))
    }

    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool, StoreError> {
        Ok(remove_owned(&mut *self.links.write().await, owner, id))
    }
}

fn owned_newest_first(links: &[SavedLink], owner: &str) -> Vec<SavedLink> {
    let mut owned: Vec<SavedLink> = links.iter().filter(|l| l.owner == owner).cloned().collect();
    owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    owned
}

fn remove_owned(links: &mut Vec<SavedLink>, owner: &str, id: Uuid) -> bool {
    let before = links.len();
    links.retain(|l| !(l.id == id && l.owner == owner));
    links.len() != before
}

/// Link store persisted as a pretty-printed JSON array
///
/// The whole file is rewritten on every change, through a temporary file
/// renamed over the original. Writers are serialized by an async mutex.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    links: Mutex<Vec<SavedLink>>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file is an empty store
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let links = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        Ok(Self {
            path,
            links: Mutex::new(links),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_all(&self, links: &[SavedLink]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(links).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)
    }
}

#[async_trait]
impl LinkStore for JsonFileStore {
    async fn insert(
        &self,
        owner: &str,
        link: &EnrichedLink,
        origin: LinkOrigin,
    ) -> Result<SavedLink, StoreError> {
        let saved = SavedLink::new(owner, link, origin);
        let mut links = self.links.lock().await;
        links.push(saved.clone());
        if let Err(e) = self.write_all(&links).await {
            links.pop();
            return Err(e);
        }
        Ok(saved)
    }

    async fn list(&self, owner: &str) -> Result<Vec<SavedLink>, StoreError> {
        Ok(owned_newest_first(&self.links.lock().await, owner))
    }

    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool, StoreError> {
        let mut links = self.links.lock().await;
        let mut remaining = links.clone();
        if !remove_owned(&mut remaining, owner, id) {
            return Ok(false);
        }
        self.write_all(&remaining).await?;
        *links = remaining;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(url: &str) -> EnrichedLink {
        EnrichedLink {
            source_url: url.to_string(),
            title: "Title".to_string(),
            body_text: "Body.".to_string(),
            summary: "- Summary".to_string(),
            categories: vec!["News".to_string()],
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_by_owner() {
        let store = MemoryStore::new();
        store
            .insert("alice", &link("https://a.example.com"), LinkOrigin::Web)
            .await
            .unwrap();
        store
            .insert("bob", &link("https://b.example.com"), LinkOrigin::Web)
            .await
            .unwrap();

        let alice = store.list("alice").await.unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].url, "https://a.example.com");
        assert_eq!(alice[0].categories, vec!["News"]);
        assert!(store.list("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = MemoryStore::new();
        let first = store
            .insert("alice", &link("https://first.example.com"), LinkOrigin::Web)
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store
            .insert("alice", &link("https://second.example.com"), LinkOrigin::Web)
            .await
            .unwrap();

        let ids: Vec<Uuid> = store.list("alice").await.unwrap().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_delete_only_own_links() {
        let store = MemoryStore::new();
        let saved = store
            .insert("alice", &link("https://a.example.com"), LinkOrigin::Web)
            .await
            .unwrap();

        assert!(!store.delete("bob", saved.id).await.unwrap());
        assert_eq!(store.list("alice").await.unwrap().len(), 1);

        assert!(store.delete("alice", saved.id).await.unwrap());
        assert!(store.list("alice").await.unwrap().is_empty());
        assert!(!store.delete("alice", saved.id).await.unwrap());
    }

    #[test]
    fn test_origin_serialization() {
        let json = serde_json::to_value(LinkOrigin::Email {
            subject: Some("Reading list".to_string()),
        })
        .unwrap();
        assert_eq!(json["kind"], "email");
        assert_eq!(json["subject"], "Reading list");
        assert_eq!(serde_json::to_value(LinkOrigin::Web).unwrap()["kind"], "web");
    }

    #[tokio::test]
    async fn test_json_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        assert!(store.list("alice").await.unwrap().is_empty());
        let saved = store
            .insert(
                "alice",
                &link("https://a.example.com"),
                LinkOrigin::Email {
                    subject: Some("Reading list".to_string()),
                },
            )
            .await
            .unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.list("alice").await.unwrap(), vec![saved.clone()]);

        assert!(!reopened.delete("bob", saved.id).await.unwrap());
        assert!(reopened.delete("alice", saved.id).await.unwrap());
        drop(reopened);

        let emptied = JsonFileStore::open(&path).await.unwrap();
        assert!(emptied.list("alice").await.unwrap().is_empty());
        assert!(!dir.path().join("links.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_json_store_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.json");
        std::fs::write(&path, "\n").unwrap();

        let store = JsonFileStore::open(&path).await.unwrap();
        assert!(store.list("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_json_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = JsonFileStore::open(&path).await;
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn test_json_store_failed_write_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("links.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        let result = store
            .insert("alice", &link("https://a.example.com"), LinkOrigin::Web)
            .await;

        assert!(matches!(result, Err(StoreError::Io { .. })));
        assert!(store.list("alice").await.unwrap().is_empty());
    }
}
