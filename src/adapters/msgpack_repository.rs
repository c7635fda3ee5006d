//! MessagePack implementation of the snapshot repository.
//!
//! This adapter uses rmp_serde for compact binary serialization, suited to
//! large Q-tables and long intervention histories.

use std::{fs::File, path::Path};

use crate::{Result, error::Error, ports::SnapshotRepository, snapshot::SessionSnapshot};

/// MessagePack-based snapshot repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    /// Create a new MessagePack repository.
    pub fn new() -> Self {
        Self
    }
}

impl SnapshotRepository for MsgPackRepository {
    fn save(&self, snapshot: &SessionSnapshot, path: &Path) -> Result<()> {
        let mut file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;

        rmp_serde::encode::write(&mut file, snapshot).map_err(|e| Error::SerializationContext {
            operation: "serialize snapshot to MessagePack".to_string(),
            message: e.to_string(),
        })?;

        Ok(())
    }

    fn load(&self, path: &Path) -> Result<SessionSnapshot> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;

        let snapshot =
            rmp_serde::decode::from_read(&file).map_err(|e| Error::SerializationContext {
                operation: "deserialize snapshot from MessagePack".to_string(),
                message: e.to_string(),
            })?;

        Ok(snapshot)
    }
}
