use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::types::StorageError;

// ============================================================================
// Persistence Trait
// ============================================================================

/// Key–value string storage for persisted records.
///
/// Backends store raw strings; encoding is the caller's job. Reads of a key
/// that was never written return `Ok(None)`.
pub trait Persistence {
    /// Read the value stored under `key`.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `data` under `key`, replacing any previous value.
    fn save(&mut self, key: &str, data: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<P: Persistence + ?Sized> Persistence for Box<P> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, data: &str) -> Result<(), StorageError> {
        (**self).save(key, data)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

// ============================================================================
// In-Memory Backend
// ============================================================================

/// Volatile backend. Used for `persist = false` sessions and in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a record, as if written by an earlier session.
    pub fn with_entry(mut self, key: &str, data: &str) -> Self {
        self.entries.insert(key.to_string(), data.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl Persistence for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, data: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), data.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

// ============================================================================
// JSON File Backend
// ============================================================================

/// One `<key>.json` file per record inside a directory.
///
/// Writes go to a uniquely named temp file that is synced and then renamed
/// over the target, so a crash mid-write leaves the previous record intact.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve the file for `key`, rejecting names that could leave `dir`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let bad = key.is_empty()
            || key == "."
            || key == ".."
            || key.contains(['/', '\\', '\0']);
        if bad {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Persistence for JsonFileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No persisted record found");
                Ok(None)
            }
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn save(&mut self, key: &str, data: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            key: key.to_string(),
            source,
        })?;
        atomic_write(&path, data.as_bytes()).map_err(|source| StorageError::Io {
            key: key.to_string(),
            source,
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// Write `content` to `dst` via temp-file-then-rename.
fn atomic_write(dst: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::time::{SystemTime, UNIX_EPOCH};

    // Unpredictable temp name; create_new refuses to follow a planted symlink.
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = dst.with_extension(format!("tmp.{:016x}", suffix));

    let result = (|| {
        let mut temp_file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        temp_file.write_all(content)?;
        temp_file.sync_all()?;
        drop(temp_file);

        // Windows rename fails when the destination exists
        #[cfg(windows)]
        if dst.exists() {
            std::fs::remove_file(dst)?;
        }

        std::fs::rename(&temp_path, dst)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    result
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tagfeed_backend_{name}"));
        std::fs::remove_dir_all(&dir).ok();
        dir
    }

    #[test]
    fn test_memory_round_trip() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.load("k").unwrap(), None);

        storage.save("k", "v1").unwrap();
        storage.save("k", "v2").unwrap();
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("v2"));

        storage.remove("k").unwrap();
        storage.remove("k").unwrap();
        assert_eq!(storage.load("k").unwrap(), None);
    }

    #[test]
    fn test_file_missing_record_is_none() {
        let dir = scratch_dir("missing");
        let storage = JsonFileStorage::new(&dir);
        assert_eq!(storage.load("feed-reader-storage").unwrap(), None);
    }

    #[test]
    fn test_file_save_creates_dir_and_overwrites() {
        let dir = scratch_dir("save");
        let mut storage = JsonFileStorage::new(&dir);

        storage.save("state", "{\"a\":1}").unwrap();
        storage.save("state", "{\"a\":2}").unwrap();

        assert_eq!(storage.load("state").unwrap().as_deref(), Some("{\"a\":2}"));
        assert!(dir.join("state.json").is_file());

        // No temp files left behind
        let leftovers: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
            .collect();
        assert!(leftovers.is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_file_remove_is_idempotent() {
        let dir = scratch_dir("remove");
        let mut storage = JsonFileStorage::new(&dir);

        storage.save("state", "x").unwrap();
        storage.remove("state").unwrap();
        storage.remove("state").unwrap();
        assert_eq!(storage.load("state").unwrap(), None);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_file_rejects_path_like_keys() {
        let storage = JsonFileStorage::new(scratch_dir("keys"));
        for key in ["", ".", "..", "../etc/passwd", "a/b", "a\\b"] {
            assert!(
                matches!(storage.path_for(key), Err(StorageError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
        assert!(storage.path_for("feed-reader-storage").is_ok());
    }

    #[test]
    fn test_boxed_backend_delegates() {
        let mut boxed: Box<dyn Persistence> = Box::new(MemoryStorage::new());
        boxed.save("k", "v").unwrap();
        assert_eq!(boxed.load("k").unwrap().as_deref(), Some("v"));
    }
}
