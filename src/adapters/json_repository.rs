//! JSON implementation of the snapshot repository.
//!
//! This is the production default: the surrounding backend and export
//! tooling exchange session state as JSON documents.

use std::{fs::File, path::Path};

use crate::{Result, error::Error, ports::SnapshotRepository, snapshot::SessionSnapshot};

/// JSON-file snapshot repository.
///
/// Snapshots are written pretty-printed so they double as human-readable
/// session reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRepository;

impl JsonRepository {
    /// Create a new JSON repository.
    pub fn new() -> Self {
        Self
    }
}

impl SnapshotRepository for JsonRepository {
    fn save(&self, snapshot: &SessionSnapshot, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        serde_json::to_writer_pretty(file, snapshot)?;
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<SessionSnapshot> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;
        let snapshot = serde_json::from_reader(file)?;
        Ok(snapshot)
    }
}
