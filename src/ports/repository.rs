//! Repository port for session persistence.
//!
//! This module defines the trait boundary between the domain and
//! infrastructure layers for snapshot storage and retrieval.

use std::path::Path;

use crate::{Result, snapshot::SessionSnapshot};

/// Port for persisting and loading session snapshots.
///
/// This trait abstracts the storage mechanism, allowing different
/// implementations (JSON, MessagePack, in-memory) without coupling the
/// domain logic to specific serialization formats.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// use floe::{ports::SnapshotRepository, snapshot::SessionSnapshot};
///
/// fn save_snapshot<R: SnapshotRepository>(
///     repo: &R,
///     snapshot: &SessionSnapshot,
///     path: &Path,
/// ) -> floe::Result<()> {
///     repo.save(snapshot, path)
/// }
/// ```
pub trait SnapshotRepository {
    /// Save a snapshot to persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be written or serialization
    /// fails.
    fn save(&self, snapshot: &SessionSnapshot, path: &Path) -> Result<()>;

    /// Load a snapshot from persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be read, or the
    /// format is invalid.
    fn load(&self, path: &Path) -> Result<SessionSnapshot>;
}
