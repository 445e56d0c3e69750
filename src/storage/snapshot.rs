//! Encoding of the persisted record.
//!
//! The record holds exactly two top-level fields, `preferences` and `feeds`.
//! Decoding is forgiving: each field is taken from the record when it is
//! present and well-formed, otherwise from the default snapshot.

use serde::Serialize;
use serde_json::Value;

use super::types::{default_feeds, Feed, StorageError, UserPreferences};

/// Name of the persisted record when no other name is configured.
pub const DEFAULT_RECORD_NAME: &str = "feed-reader-storage";

/// The persisted subset of store state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub preferences: UserPreferences,
    pub feeds: Vec<Feed>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            preferences: UserPreferences::default(),
            feeds: default_feeds(),
        }
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    preferences: &'a UserPreferences,
    feeds: &'a [Feed],
}

/// Encode the persisted subset as JSON.
pub fn encode(preferences: &UserPreferences, feeds: &[Feed]) -> Result<String, StorageError> {
    Ok(serde_json::to_string(&SnapshotRef { preferences, feeds })?)
}

impl Snapshot {
    /// Merge a raw persisted record over the defaults, field by field.
    ///
    /// `None` (no record), unparseable JSON, or a non-object record yields the
    /// full default snapshot. A malformed field falls back alone.
    pub fn decode(raw: Option<&str>) -> Self {
        let mut snapshot = Self::default();

        let Some(raw) = raw else {
            return snapshot;
        };

        let mut record = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                tracing::warn!("Persisted record is not a JSON object, using defaults");
                return snapshot;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Persisted record is not valid JSON, using defaults");
                return snapshot;
            }
        };

        if let Some(value) = record.remove("preferences") {
            match serde_json::from_value::<UserPreferences>(value) {
                Ok(prefs) => snapshot.preferences = prefs,
                Err(e) => {
                    tracing::warn!(error = %e, "Malformed persisted preferences, using defaults")
                }
            }
        }

        if let Some(value) = record.remove("feeds") {
            match serde_json::from_value::<Vec<Feed>>(value) {
                Ok(feeds) => snapshot.feeds = feeds,
                Err(e) => tracing::warn!(error = %e, "Malformed persisted feeds, using defaults"),
            }
        }

        snapshot
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_absent_record_is_default() {
        assert_eq!(Snapshot::decode(None), Snapshot::default());
    }

    #[test]
    fn test_garbage_record_is_default() {
        assert_eq!(Snapshot::decode(Some("not json {{")), Snapshot::default());
        assert_eq!(Snapshot::decode(Some("[1, 2, 3]")), Snapshot::default());
    }

    #[test]
    fn test_default_snapshot_contents() {
        let snapshot = Snapshot::default();
        let ids: Vec<_> = snapshot.feeds.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["nasa", "hackernews"]);
        assert_eq!(snapshot.feeds[0].category, "Science");
        assert_eq!(snapshot.feeds[1].category, "Technology");
    }

    #[test]
    fn test_persisted_field_wins_per_field() {
        let raw = r#"{"feeds": [{"id": "f1", "title": "T", "url": "u", "category": "Art"}]}"#;
        let snapshot = Snapshot::decode(Some(raw));

        assert_eq!(snapshot.feeds.len(), 1);
        assert_eq!(snapshot.feeds[0].id, "f1");
        // preferences missing from the record
        assert_eq!(snapshot.preferences, UserPreferences::default());
    }

    #[test]
    fn test_malformed_field_falls_back_alone() {
        let raw = r#"{"preferences": {"theme": "dark"}, "feeds": "oops"}"#;
        let snapshot = Snapshot::decode(Some(raw));

        assert_eq!(snapshot.preferences.theme, Theme::Dark);
        assert_eq!(snapshot.feeds, default_feeds());
    }

    #[test]
    fn test_encode_has_exactly_two_fields() {
        let snapshot = Snapshot::default();
        let json = encode(&snapshot.preferences, &snapshot.feeds).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let obj = value.as_object().unwrap();

        let mut keys: Vec<_> = obj.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["feeds", "preferences"]);
        assert!(obj["preferences"].get("selectedCategories").is_some());
    }

    #[test]
    fn test_encode_decode_preserves_unknown_theme() {
        let mut snapshot = Snapshot::default();
        snapshot.preferences.theme = Theme::Other("sepia".to_string());

        let json = encode(&snapshot.preferences, &snapshot.feeds).unwrap();
        assert_eq!(Snapshot::decode(Some(&json)), snapshot);
    }
}
