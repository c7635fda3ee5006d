//! In-memory snapshot repository for testing.
//!
//! This adapter provides a pure in-memory implementation of
//! SnapshotRepository, enabling fast tests without any file system I/O.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
};

use crate::{Result, error::Error, ports::SnapshotRepository, snapshot::SessionSnapshot};

/// In-memory repository for testing.
///
/// Stores snapshots in a shared HashMap keyed by path, avoiding file system
/// I/O entirely.
///
/// # Thread Safety
///
/// This repository is thread-safe and can be safely cloned and shared
/// across threads. All clones share the same underlying storage.
#[derive(Clone)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Get the number of snapshots currently stored.
    pub fn count(&self) -> usize {
        self.storage.lock().unwrap().len()
    }

    /// Clear all stored snapshots.
    pub fn clear(&self) {
        self.storage.lock().unwrap().clear();
    }

    /// Check if a snapshot exists at the given path.
    pub fn contains(&self, path: &Path) -> bool {
        let key = path.to_string_lossy().to_string();
        self.storage.lock().unwrap().contains_key(&key)
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotRepository for InMemoryRepository {
    fn save(&self, snapshot: &SessionSnapshot, path: &Path) -> Result<()> {
        let key = path.to_string_lossy().to_string();

        let bytes = rmp_serde::to_vec(snapshot).map_err(|e| Error::SerializationContext {
            operation: "serialize snapshot for in-memory storage".to_string(),
            message: e.to_string(),
        })?;

        self.storage.lock().unwrap().insert(key, bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<SessionSnapshot> {
        let key = path.to_string_lossy().to_string();
        let storage = self.storage.lock().unwrap();

        let bytes = storage.get(&key).ok_or_else(|| Error::Io {
            operation: format!("load snapshot from in-memory storage at {path:?}"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "key not found in memory"),
        })?;

        rmp_serde::from_slice(bytes).map_err(|e| Error::SerializationContext {
            operation: "deserialize snapshot from in-memory storage".to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::test_support::sample_snapshot;

    #[test]
    fn test_in_memory_save_and_load() {
        let repo = InMemoryRepository::new();
        let snapshot = sample_snapshot();
        let path = Path::new("test_session");

        assert_eq!(repo.count(), 0);
        assert!(!repo.contains(path));

        repo.save(&snapshot, path).unwrap();
        assert_eq!(repo.count(), 1);
        assert!(repo.contains(path));

        let loaded = repo.load(path).unwrap();
        assert_eq!(loaded.map, snapshot.map);
        assert_eq!(loaded.totals, snapshot.totals);
    }

    #[test]
    fn test_load_nonexistent_returns_error() {
        let repo = InMemoryRepository::new();
        assert!(repo.load(Path::new("nonexistent")).is_err());
    }

    #[test]
    fn test_clone_shares_storage() {
        let repo1 = InMemoryRepository::new();
        let repo2 = repo1.clone();

        let snapshot = sample_snapshot();
        repo1.save(&snapshot, Path::new("shared")).unwrap();

        let loaded = repo2.load(Path::new("shared")).unwrap();
        assert_eq!(loaded.seed, snapshot.seed);
        assert_eq!(repo1.count(), 1);
        assert_eq!(repo2.count(), 1);
    }
}
