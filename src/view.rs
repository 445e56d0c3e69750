//! Filter/rank computation for the item list.
//!
//! A pure function of the current feed items and preferences. Callers either
//! pull it on demand (`Store::view`) or recompute it from a store subscription.

use crate::freshness::parse_pub_date;
use crate::storage::{FeedItem, UserPreferences};

// ============================================================================
// View Types
// ============================================================================

/// One visible item with the data the presentation layer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedItem<'a> {
    pub item: &'a FeedItem,
    /// Search tags found in the item, in `search_tags` order.
    pub matched_tags: Vec<&'a str>,
    pub is_read: bool,
    pub is_bookmarked: bool,
}

/// Outcome of a view computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedView<'a> {
    /// Preferences are not available yet; show a loading indicator.
    Loading,
    /// Preferences are loaded but nothing passes the filters.
    NoMatches,
    /// Visible items, best match first.
    Items(Vec<RankedItem<'a>>),
}

impl<'a> FeedView<'a> {
    /// Visible items, empty for `Loading` and `NoMatches`.
    pub fn items(&self) -> &[RankedItem<'a>] {
        match self {
            Self::Items(items) => items,
            _ => &[],
        }
    }
}

// ============================================================================
// Tag Matching
// ============================================================================

/// Tags from `search_tags` that occur in the item's title or content.
///
/// Case-insensitive substring match: tag `cat` matches `scatter`.
/// Duplicate entries in `search_tags` are each counted as stored.
pub fn matching_tags<'t>(item: &FeedItem, search_tags: &'t [String]) -> Vec<&'t str> {
    if search_tags.is_empty() {
        return Vec::new();
    }
    let haystack = format!("{} {}", item.title, item.content).to_lowercase();
    search_tags
        .iter()
        .filter(|tag| haystack.contains(&tag.to_lowercase()))
        .map(String::as_str)
        .collect()
}

// ============================================================================
// Computation
// ============================================================================

/// Compute the visible, ordered items.
///
/// 1. Keep items whose category is selected.
/// 2. With search tags set, keep items matching at least one tag.
/// 3. Sort by matched-tag count, then publication date, both descending.
///    The sort is stable; unparseable dates sort after every valid one.
pub fn compute<'a>(
    items: &'a [FeedItem],
    preferences: Option<&'a UserPreferences>,
) -> FeedView<'a> {
    let Some(prefs) = preferences else {
        return FeedView::Loading;
    };

    let mut ranked: Vec<(RankedItem<'a>, Option<i64>)> = items
        .iter()
        .filter(|item| prefs.selected_categories.contains(&item.category))
        .filter_map(|item| {
            let matched_tags = matching_tags(item, &prefs.search_tags);
            if !prefs.search_tags.is_empty() && matched_tags.is_empty() {
                return None;
            }
            let published = parse_pub_date(&item.pub_date).map(|dt| dt.timestamp_millis());
            Some((
                RankedItem {
                    item,
                    matched_tags,
                    is_read: prefs.is_read(&item.id),
                    is_bookmarked: prefs.is_bookmarked(&item.id),
                },
                published,
            ))
        })
        .collect();

    ranked.sort_by(|(a, a_time), (b, b_time)| {
        b.matched_tags
            .len()
            .cmp(&a.matched_tags.len())
            .then_with(|| b_time.cmp(a_time))
    });

    tracing::trace!(
        total = items.len(),
        visible = ranked.len(),
        tags = prefs.search_tags.len(),
        "Computed feed view"
    );

    if ranked.is_empty() {
        FeedView::NoMatches
    } else {
        FeedView::Items(ranked.into_iter().map(|(item, _)| item).collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
