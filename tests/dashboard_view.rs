//! Integration tests for the store → view flow and its properties.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tagfeed::storage::{FeedItem, MemoryStorage, DEFAULT_RECORD_NAME};
use tagfeed::store::{PreferencesPatch, Store, StoreState};
use tagfeed::view::{self, FeedView};

fn item(id: &str, category: &str, title: &str, pub_date: &str) -> FeedItem {
    FeedItem {
        id: id.to_string(),
        title: title.to_string(),
        content: String::new(),
        link: format!("https://example.com/{id}"),
        pub_date: pub_date.to_string(),
        category: category.to_string(),
    }
}

fn store_with(items: Vec<FeedItem>) -> Store<MemoryStorage> {
    let mut store = Store::open(MemoryStorage::new(), DEFAULT_RECORD_NAME);
    store.set_feed_items(items);
    store
}

fn visible_ids(store: &Store<MemoryStorage>) -> Vec<String> {
    store
        .view()
        .items()
        .iter()
        .map(|r| r.item.id.clone())
        .collect()
}

// ============================================================================
// Pull
// ============================================================================

#[test]
fn test_only_selected_categories_are_visible() {
    let mut store = store_with(vec![
        item("s", "Science", "Comet", "2024-01-01T00:00:00Z"),
        item("t", "Technology", "Chip", "2024-01-02T00:00:00Z"),
        item("a", "Art", "Fresco", "2024-01-03T00:00:00Z"),
    ]);
    assert_eq!(visible_ids(&store), vec!["t", "s"]);

    store.update_preferences(PreferencesPatch {
        selected_categories: Some(vec!["Science".to_string()]),
        ..Default::default()
    });
    assert_eq!(visible_ids(&store), vec!["s"]);
}

#[test]
fn test_search_tags_filter_and_rank() {
    let mut store = store_with(vec![
        item("recent", "Science", "Mars update", "2024-05-10T00:00:00Z"),
        item("both", "Technology", "Mars rover software", "2024-05-01T00:00:00Z"),
        item("neither", "Science", "Ocean survey", "2024-05-20T00:00:00Z"),
    ]);
    store.add_search_tag("mars");
    store.add_search_tag("rover");

    assert_eq!(visible_ids(&store), vec!["both", "recent"]);
}

#[test]
fn test_preset_application_changes_view() {
    let mut store = store_with(vec![
        item("a", "Science", "Black hole imaged", "2024-05-10T00:00:00Z"),
        item("b", "Science", "New vaccine trial", "2024-05-11T00:00:00Z"),
    ]);
    let preset = store.add_tag_preset("Astro", vec!["hole".to_string()]);
    assert_eq!(visible_ids(&store), vec!["b", "a"]);

    store.apply_tag_preset(&preset);
    assert_eq!(visible_ids(&store), vec!["a"]);

    store.remove_search_tag("hole");
    assert_eq!(visible_ids(&store), vec!["b", "a"]);
}

#[test]
fn test_no_matches_distinct_from_loading() {
    let mut store = store_with(vec![item("a", "Science", "x", "2024-01-01T00:00:00Z")]);
    store.add_search_tag("zzz");

    assert_eq!(store.view(), FeedView::NoMatches);
    assert_eq!(view::compute(store.feed_items(), None), FeedView::Loading);
}

#[test]
fn test_read_and_bookmark_flags_follow_toggles() {
    let mut store = store_with(vec![item("a", "Science", "x", "2024-01-01T00:00:00Z")]);
    store.toggle_read("a");
    store.toggle_bookmark("a");

    let view = store.view();
    let first = &view.items()[0];
    assert!(first.is_read);
    assert!(first.is_bookmarked);
}

// ============================================================================
// Push
// ============================================================================

#[test]
fn test_subscriber_recomputes_view_on_new_batch() {
    let mut store = Store::open(MemoryStorage::new(), DEFAULT_RECORD_NAME);
    let visible = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&visible);

    store.subscribe(move |state: &StoreState| {
        let count = view::compute(&state.feed_items, Some(&state.preferences))
            .items()
            .len();
        sink.borrow_mut().push(count);
    });

    store.set_feed_items(vec![
        item("a", "Science", "x", "2024-01-01T00:00:00Z"),
        item("b", "Art", "y", "2024-01-01T00:00:00Z"),
    ]);
    store.toggle_read("a");
    store.add_search_tag("nothing-matches");

    assert_eq!(*visible.borrow(), vec![1, 1, 0]);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_toggle_bookmark_twice_is_identity(
        existing in proptest::collection::vec("[a-z]{1,6}", 0..8),
        target in "[a-z]{1,6}",
    ) {
        let mut store = Store::open(MemoryStorage::new(), DEFAULT_RECORD_NAME);
        for id in &existing {
            if !store.preferences().is_bookmarked(id) {
                store.toggle_bookmark(id);
            }
        }
        let before: BTreeSet<String> =
            store.preferences().bookmarked_items.iter().cloned().collect();

        store.toggle_bookmark(&target);
        store.toggle_bookmark(&target);

        let after: BTreeSet<String> =
            store.preferences().bookmarked_items.iter().cloned().collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn prop_toggle_read_twice_is_identity(
        existing in proptest::collection::vec("[a-z]{1,6}", 0..8),
        target in "[a-z]{1,6}",
    ) {
        let mut store = Store::open(MemoryStorage::new(), DEFAULT_RECORD_NAME);
        for id in &existing {
            if !store.preferences().is_read(id) {
                store.toggle_read(id);
            }
        }
        let before: BTreeSet<String> = store.preferences().read_items.iter().cloned().collect();

        store.toggle_read(&target);
        store.toggle_read(&target);

        let after: BTreeSet<String> = store.preferences().read_items.iter().cloned().collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn prop_search_tags_never_duplicate(
        tags in proptest::collection::vec("[a-c]{1,2}", 0..20),
        preset in proptest::collection::vec("[a-c]{1,2}", 0..6),
    ) {
        let mut store = Store::open(MemoryStorage::new(), DEFAULT_RECORD_NAME);
        for tag in &tags {
            store.add_search_tag(tag);
        }
        let id = store.add_tag_preset("p", preset.clone());
        store.apply_tag_preset(&id);

        let search = &store.preferences().search_tags;
        let unique: BTreeSet<&String> = search.iter().collect();
        prop_assert_eq!(unique.len(), search.len());

        let expected: BTreeSet<&String> = tags.iter().chain(preset.iter()).collect();
        prop_assert_eq!(unique, expected);
    }

    #[test]
    fn prop_view_is_sorted_by_match_count(
        titles in proptest::collection::vec("(mars|moon|sun| ){0,6}", 1..12),
    ) {
        let items: Vec<FeedItem> = titles
            .iter()
            .enumerate()
            .map(|(i, t)| item(&i.to_string(), "Science", t, "2024-01-01T00:00:00Z"))
            .collect();
        let mut store = store_with(items);
        store.add_search_tag("mars");
        store.add_search_tag("moon");

        let view = store.view();
        let counts: Vec<usize> = view.items().iter().map(|r| r.matched_tags.len()).collect();
        prop_assert!(counts.windows(2).all(|w| w[0] >= w[1]));
        prop_assert!(counts.iter().all(|&c| c > 0));
    }
}
