//! Preference store: the single source of truth for feeds, feed items and
//! user preferences.
//!
//! State transitions are pure (`StoreState::apply`) and produce a new state
//! value. `Store` owns the current value, swaps it wholesale after each
//! mutation, persists `{preferences, feeds}`, and notifies subscribers.
//!
//! There is no global instance; the application root constructs a `Store` and
//! passes it by reference.

use std::sync::Arc;

use crate::storage::{encode, Feed, FeedItem, Persistence, Snapshot, TagPreset, UserPreferences};
use crate::theme::Theme;
use crate::view::{self, FeedView};

// ============================================================================
// State and Mutations
// ============================================================================

/// Complete store state.
///
/// Feed items sit behind an `Arc` so that state copies made by each
/// transition do not duplicate the item batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreState {
    pub feeds: Vec<Feed>,
    pub feed_items: Arc<Vec<FeedItem>>,
    pub preferences: UserPreferences,
}

impl StoreState {
    /// Fresh session state from a persisted snapshot. Feed items start empty.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            feeds: snapshot.feeds,
            feed_items: Arc::new(Vec::new()),
            preferences: snapshot.preferences,
        }
    }
}

impl Default for StoreState {
    fn default() -> Self {
        Self::from_snapshot(Snapshot::default())
    }
}

/// Shallow patch for `update_preferences`. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencesPatch {
    pub selected_categories: Option<Vec<String>>,
    pub selected_feeds: Option<Vec<String>>,
    pub bookmarked_items: Option<Vec<String>>,
    pub read_items: Option<Vec<String>>,
    pub search_tags: Option<Vec<String>>,
    pub tag_presets: Option<Vec<TagPreset>>,
    pub theme: Option<Theme>,
}

/// A named state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    AddFeed(Feed),
    RemoveFeed(String),
    UpdatePreferences(PreferencesPatch),
    SetFeedItems(Vec<FeedItem>),
    ToggleBookmark(String),
    ToggleRead(String),
    AddSearchTag(String),
    RemoveSearchTag(String),
    /// Carries the preset id so that `apply` stays deterministic.
    AddTagPreset {
        id: String,
        name: String,
        tags: Vec<String>,
    },
    RemoveTagPreset(String),
    ApplyTagPreset(String),
    ToggleTheme,
}

/// Remove `value` if present, else append it.
fn toggle_membership(set: &mut Vec<String>, value: &str) {
    if let Some(pos) = set.iter().position(|v| v == value) {
        set.remove(pos);
    } else {
        set.push(value.to_string());
    }
}

fn insert_unique(set: &mut Vec<String>, value: &str) {
    if !set.iter().any(|v| v == value) {
        set.push(value.to_string());
    }
}

impl StoreState {
    /// Compute the state that results from `mutation`.
    ///
    /// Operations referring to an absent id leave the state unchanged.
    pub fn apply(&self, mutation: &Mutation) -> StoreState {
        let mut next = self.clone();
        let prefs = &mut next.preferences;

        match mutation {
            Mutation::AddFeed(feed) => next.feeds.push(feed.clone()),
            Mutation::RemoveFeed(id) => next.feeds.retain(|f| &f.id != id),
            Mutation::UpdatePreferences(patch) => {
                let patch = patch.clone();
                if let Some(v) = patch.selected_categories {
                    prefs.selected_categories = v;
                }
                if let Some(v) = patch.selected_feeds {
                    prefs.selected_feeds = v;
                }
                if let Some(v) = patch.bookmarked_items {
                    prefs.bookmarked_items = v;
                }
                if let Some(v) = patch.read_items {
                    prefs.read_items = v;
                }
                if let Some(v) = patch.search_tags {
                    prefs.search_tags = v;
                }
                if let Some(v) = patch.tag_presets {
                    prefs.tag_presets = v;
                }
                if let Some(v) = patch.theme {
                    prefs.theme = v;
                }
            }
            Mutation::SetFeedItems(items) => next.feed_items = Arc::new(items.clone()),
            Mutation::ToggleBookmark(item_id) => {
                toggle_membership(&mut prefs.bookmarked_items, item_id)
            }
            Mutation::ToggleRead(item_id) => toggle_membership(&mut prefs.read_items, item_id),
            Mutation::AddSearchTag(tag) => insert_unique(&mut prefs.search_tags, tag),
            Mutation::RemoveSearchTag(tag) => prefs.search_tags.retain(|t| t != tag),
            Mutation::AddTagPreset { id, name, tags } => prefs.tag_presets.push(TagPreset {
                id: id.clone(),
                name: name.clone(),
                tags: tags.clone(),
            }),
            Mutation::RemoveTagPreset(preset_id) => {
                prefs.tag_presets.retain(|p| &p.id != preset_id)
            }
            Mutation::ApplyTagPreset(preset_id) => {
                let Some(preset) = self.preferences.find_preset(preset_id) else {
                    return next;
                };
                for tag in &preset.tags {
                    insert_unique(&mut prefs.search_tags, tag);
                }
            }
            Mutation::ToggleTheme => prefs.theme = prefs.theme.toggled(),
        }

        next
    }
}

// ============================================================================
// Store
// ============================================================================

/// Handle returned by `Store::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StoreState)>;

/// Owner of the live state, its persistence backend, and its subscribers.
pub struct Store<P: Persistence> {
    state: StoreState,
    storage: P,
    record_name: String,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_listener: u64,
}

impl<P: Persistence> Store<P> {
    /// Build the session state from whatever `storage` holds under
    /// `record_name`, falling back to defaults field by field.
    pub fn open(storage: P, record_name: impl Into<String>) -> Self {
        let record_name = record_name.into();
        let raw = match storage.load(&record_name) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(record = %record_name, error = %e, "Failed to read persisted state, using defaults");
                None
            }
        };
        let snapshot = Snapshot::decode(raw.as_deref());
        tracing::debug!(
            record = %record_name,
            feeds = snapshot.feeds.len(),
            presets = snapshot.preferences.tag_presets.len(),
            "Store initialized"
        );

        Self {
            state: StoreState::from_snapshot(snapshot),
            storage,
            record_name,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    // ========================================================================
    // Read Surface
    // ========================================================================

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn feeds(&self) -> &[Feed] {
        &self.state.feeds
    }

    pub fn feed_items(&self) -> &[FeedItem] {
        &self.state.feed_items
    }

    pub fn preferences(&self) -> &UserPreferences {
        &self.state.preferences
    }

    /// Filtered, ranked items for the current state.
    pub fn view(&self) -> FeedView<'_> {
        view::compute(&self.state.feed_items, Some(&self.state.preferences))
    }

    pub fn storage(&self) -> &P {
        &self.storage
    }

    pub fn record_name(&self) -> &str {
        &self.record_name
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Register `listener` to be called with the new state after each
    /// mutation that changes it.
    pub fn subscribe(&mut self, listener: impl FnMut(&StoreState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Drop a listener. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(lid, _)| *lid != id);
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Apply `mutation`, persist, and notify listeners if the state changed.
    pub fn dispatch(&mut self, mutation: Mutation) -> &StoreState {
        let next = self.state.apply(&mutation);
        let changed = next != self.state;
        self.state = next;

        self.persist();

        if changed {
            for (_, listener) in self.listeners.iter_mut() {
                listener(&self.state);
            }
        } else {
            tracing::debug!(?mutation, "Mutation left state unchanged");
        }

        &self.state
    }

    /// Write `{preferences, feeds}`. Failures are logged, never returned.
    fn persist(&mut self) {
        let encoded = match encode(&self.state.preferences, &self.state.feeds) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode store state");
                return;
            }
        };
        if let Err(e) = self.storage.save(&self.record_name, &encoded) {
            tracing::warn!(record = %self.record_name, error = %e, "Failed to persist store state");
        }
    }

    /// Append a feed. Duplicate ids are not checked.
    pub fn add_feed(&mut self, feed: Feed) -> &StoreState {
        self.dispatch(Mutation::AddFeed(feed))
    }

    pub fn remove_feed(&mut self, id: &str) -> &StoreState {
        self.dispatch(Mutation::RemoveFeed(id.to_string()))
    }

    pub fn update_preferences(&mut self, patch: PreferencesPatch) -> &StoreState {
        self.dispatch(Mutation::UpdatePreferences(patch))
    }

    /// Replace the whole item batch.
    pub fn set_feed_items(&mut self, items: Vec<FeedItem>) -> &StoreState {
        tracing::debug!(count = items.len(), "Replacing feed items");
        self.dispatch(Mutation::SetFeedItems(items))
    }

    pub fn toggle_bookmark(&mut self, item_id: &str) -> &StoreState {
        self.dispatch(Mutation::ToggleBookmark(item_id.to_string()))
    }

    pub fn toggle_read(&mut self, item_id: &str) -> &StoreState {
        self.dispatch(Mutation::ToggleRead(item_id.to_string()))
    }

    pub fn add_search_tag(&mut self, tag: &str) -> &StoreState {
        self.dispatch(Mutation::AddSearchTag(tag.to_string()))
    }

    pub fn remove_search_tag(&mut self, tag: &str) -> &StoreState {
        self.dispatch(Mutation::RemoveSearchTag(tag.to_string()))
    }

    /// Create a preset and return its generated id.
    pub fn add_tag_preset(&mut self, name: &str, tags: Vec<String>) -> String {
        let id = format!("preset-{}", uuid::Uuid::new_v4());
        self.dispatch(Mutation::AddTagPreset {
            id: id.clone(),
            name: name.to_string(),
            tags,
        });
        id
    }

    pub fn remove_tag_preset(&mut self, preset_id: &str) -> &StoreState {
        self.dispatch(Mutation::RemoveTagPreset(preset_id.to_string()))
    }

    /// Union the preset's tags into the search tags. Unknown ids are a no-op.
    pub fn apply_tag_preset(&mut self, preset_id: &str) -> &StoreState {
        self.dispatch(Mutation::ApplyTagPreset(preset_id.to_string()))
    }

    pub fn toggle_theme(&mut self) -> &StoreState {
        self.dispatch(Mutation::ToggleTheme)
    }
}

// ============================================================================
// Tests
// ============================================================================
