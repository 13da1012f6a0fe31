//! Core data models for one similarity-analysis run.
//!
//! An [`Item`] is an issue or pull request under analysis. The candidate set
//! (a `Vec<Item>`) is owned by a single run: the embedding generator mutates
//! it once, then the index queries read it. Nothing is shared across runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether an item is an issue or a pull request.
///
/// Together with `number` this forms the identity key of an item within one
/// repository's candidate set (issue #7 and PR #7 are distinct items).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Issue,
    PullRequest,
}

impl ItemType {
    /// Parse the CLI spelling of an item type.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "issue" | "issues" => Some(ItemType::Issue),
            "pull_request" | "pull_requests" => Some(ItemType::PullRequest),
            _ => None,
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemType::Issue => write!(f, "issue"),
            ItemType::PullRequest => write!(f, "pull_request"),
        }
    }
}

/// Lifecycle state of an item. `Merged` only occurs for pull requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    Open,
    Closed,
    Merged,
}

/// An issue or pull request in the candidate set.
///
/// `embedding` and `content_hash` start out absent and are populated by the
/// batch generator. `embedding` may remain absent when generation fails for
/// this item; `content_hash` is always populated (pure computation).
#[derive(Debug, Clone)]
pub struct Item {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: ItemState,
    pub item_type: ItemType,
    pub created_at: DateTime<Utc>,
    pub url: String,
    pub embedding: Option<Vec<f32>>,
    pub content_hash: Option<String>,
}

impl Item {
    pub fn new(
        number: u64,
        title: impl Into<String>,
        body: Option<String>,
        state: ItemState,
        item_type: ItemType,
        created_at: DateTime<Utc>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            number,
            title: title.into(),
            body,
            state,
            item_type,
            created_at,
            url: url.into(),
            embedding: None,
            content_hash: None,
        }
    }

    /// Identity key within one repository's candidate set.
    pub fn key(&self) -> (u64, ItemType) {
        (self.number, self.item_type)
    }

    /// The text sent to the embedding provider: title and body joined by a
    /// blank line.
    pub fn embed_text(&self) -> String {
        match self.body.as_deref() {
            Some(body) if !body.trim().is_empty() => {
                format!("{}\n\n{}", self.title, body)
            }
            _ => self.title.clone(),
        }
    }
}

/// A scored match of one item against a target. Only produced when the
/// similarity meets the query threshold.
#[derive(Debug, Clone)]
pub struct SimilarityResult<'a> {
    pub item: &'a Item,
    pub similarity: f32,
}

/// An unordered pair of items with their similarity score. The triangular
/// enumeration in the index guarantees each unordered pair appears at most
/// once per run.
#[derive(Debug, Clone)]
pub struct SimilarityPair<'a> {
    pub item1: &'a Item,
    pub item2: &'a Item,
    pub similarity: f32,
}
