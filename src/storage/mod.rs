mod backend;
mod snapshot;
mod types;

pub use backend::{JsonFileStorage, MemoryStorage, Persistence};
pub use snapshot::{encode, Snapshot, DEFAULT_RECORD_NAME};
pub use types::{default_feeds, Feed, FeedItem, StorageError, TagPreset, UserPreferences};
