//! Tag-ranked feed dashboard core.
//!
//! - [`store`] holds feeds, the current item batch and user preferences, and
//!   persists `{preferences, feeds}` through a [`storage::Persistence`] backend.
//! - [`view`] filters and ranks the item batch for the current preferences.
//! - [`freshness`] turns publication dates into `FRESH` / `N Days` labels.
//!
//! ```
//! use tagfeed::storage::{MemoryStorage, DEFAULT_RECORD_NAME};
//! use tagfeed::store::Store;
//!
//! let mut store = Store::open(MemoryStorage::new(), DEFAULT_RECORD_NAME);
//! store.add_search_tag("mars");
//! assert_eq!(store.preferences().search_tags, vec!["mars"]);
//! ```

pub mod config;
pub mod freshness;
pub mod storage;
pub mod store;
pub mod theme;
pub mod util;
pub mod view;
