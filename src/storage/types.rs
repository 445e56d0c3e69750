use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::theme::Theme;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised by a storage backend.
///
/// The store never hands these to its callers; they are logged and the
/// in-memory state stays authoritative for the rest of the session.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("Storage I/O failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The record could not be encoded
    #[error("Failed to serialize persisted state: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Record name would escape the storage directory
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

// ============================================================================
// Default Snapshot
// ============================================================================

/// Feeds every fresh installation starts with.
pub fn default_feeds() -> Vec<Feed> {
    vec![
        Feed {
            id: "nasa".to_string(),
            title: "NASA Breaking News".to_string(),
            url: "https://www.nasa.gov/news-release/feed/".to_string(),
            category: "Science".to_string(),
        },
        Feed {
            id: "hackernews".to_string(),
            title: "Hacker News".to_string(),
            url: "https://hnrss.org/frontpage".to_string(),
            category: "Technology".to_string(),
        },
    ]
}

// ============================================================================
// Data Structures
// ============================================================================

/// A subscribed content source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub id: String,
    pub title: String,
    pub url: String,
    pub category: String,
}

/// One syndicated entry, as delivered by the fetch collaborator.
///
/// `pub_date` is kept as the raw ISO-8601 string; parsing happens at the
/// point of use so a malformed date never rejects a whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub link: String,
    pub pub_date: String,
    pub category: String,
}

/// A named bundle of search tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPreset {
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
}

/// Everything the user has chosen, persisted across sessions.
///
/// Set-valued fields are insertion-ordered vectors. Uniqueness is enforced by
/// the store operations that insert into them, not by the type.
///
/// Missing keys in a persisted record fall back to the default preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserPreferences {
    pub selected_categories: Vec<String>,
    pub selected_feeds: Vec<String>,
    pub bookmarked_items: Vec<String>,
    pub read_items: Vec<String>,
    pub search_tags: Vec<String>,
    pub tag_presets: Vec<TagPreset>,
    pub theme: Theme,
}

impl Default for UserPreferences {
    fn default() -> Self {
        let feeds = default_feeds();
        Self {
            selected_categories: vec!["Science".to_string(), "Technology".to_string()],
            selected_feeds: feeds.into_iter().map(|f| f.id).collect(),
            bookmarked_items: Vec::new(),
            read_items: Vec::new(),
            search_tags: Vec::new(),
            tag_presets: Vec::new(),
            theme: Theme::Light,
        }
    }
}

impl UserPreferences {
    pub fn is_bookmarked(&self, item_id: &str) -> bool {
        self.bookmarked_items.iter().any(|id| id == item_id)
    }

    pub fn is_read(&self, item_id: &str) -> bool {
        self.read_items.iter().any(|id| id == item_id)
    }

    pub fn find_preset(&self, preset_id: &str) -> Option<&TagPreset> {
        self.tag_presets.iter().find(|p| p.id == preset_id)
    }
}

// ============================================================================
// Tests
// ============================================================================
