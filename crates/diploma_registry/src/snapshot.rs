//! JSON snapshots of registry state.
//!
//! A snapshot holds exactly the data model: the admin and every record in
//! creation order. The recipient index and the total count are rebuilt from
//! the record order on restore.

use crate::access::AccessController;
use crate::clock::{Clock, SystemClock};
use crate::errors::*;
use crate::index::RecipientIndex;
use crate::registry::{DiplomaRegistry, RegistryState};
use crate::store::RecordStore;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub version: u32,
    pub admin: Identity,
    pub records: Vec<DiplomaRecord>,
    pub last_issued_at: u64,
}

impl RegistrySnapshot {
    /// Write the snapshot as pretty JSON, replacing `path` atomically.
    ///
    /// Each call stages into its own temp file next to `path`. Callers must
    /// serialize their own load, modify, save cycles.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let data = serde_json::to_string_pretty(self)?;
        let mut staged = NamedTempFile::new_in(parent)?;
        staged.write_all(data.as_bytes())?;
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|err| err.error)?;

        debug!(path = %path.display(), records = self.records.len(), "Registry snapshot saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let snapshot: RegistrySnapshot = serde_json::from_str(&data)?;
        debug!(path = %path.display(), records = snapshot.records.len(), "Registry snapshot loaded");
        Ok(snapshot)
    }

    /// Rebuild the registry state, checking every data-model invariant.
    fn into_state(self) -> Result<RegistryState> {
        if self.version != SNAPSHOT_VERSION {
            return Err(RegistryError::CorruptSnapshot(format!(
                "unsupported snapshot version {}",
                self.version
            )));
        }
        let access = AccessController::new(self.admin)
            .map_err(|_| RegistryError::CorruptSnapshot("admin is the zero identity".into()))?;

        let mut store = RecordStore::new();
        let mut index = RecipientIndex::new();
        let mut previous_issued_at = 0u64;

        for record in self.records {
            let fingerprint = record.fingerprint;
            if !record.exists {
                return Err(RegistryError::CorruptSnapshot(format!(
                    "record {fingerprint} is not marked as existing"
                )));
            }
            if fingerprint.is_zero() {
                return Err(RegistryError::CorruptSnapshot(
                    "record with zero fingerprint".into(),
                ));
            }
            if record.recipient.is_zero() {
                return Err(RegistryError::CorruptSnapshot(format!(
                    "record {fingerprint} has zero recipient"
                )));
            }
            if record.issued_at < previous_issued_at {
                return Err(RegistryError::CorruptSnapshot(format!(
                    "record {fingerprint} issued before its predecessor"
                )));
            }
            previous_issued_at = record.issued_at;

            let recipient = record.recipient;
            if !store.insert(record) {
                return Err(RegistryError::CorruptSnapshot(format!(
                    "duplicate record {fingerprint}"
                )));
            }
            index.append(recipient, fingerprint);
        }

        if self.last_issued_at < previous_issued_at {
            return Err(RegistryError::CorruptSnapshot(
                "last issuance time precedes stored records".into(),
            ));
        }

        Ok(RegistryState {
            access,
            store,
            index,
            last_issued_at: self.last_issued_at,
        })
    }
}

impl DiplomaRegistry {
    /// Capture a consistent copy of the registry state.
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.read_state(|state| RegistrySnapshot {
            version: SNAPSHOT_VERSION,
            admin: state.access.admin(),
            records: state.store.iter_in_order().cloned().collect(),
            last_issued_at: state.last_issued_at,
        })
    }

    /// Restore a registry from a snapshot.
    pub fn from_snapshot(snapshot: RegistrySnapshot, clock: Arc<dyn Clock>) -> Result<Self> {
        let state = snapshot.into_state()?;
        info!(
            admin = %state.access.admin(),
            total = state.index.total_count(),
            "Diploma registry restored from snapshot"
        );
        Ok(DiplomaRegistry::from_state(state, clock))
    }

    /// Load a registry from a snapshot file using the system clock.
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_snapshot(RegistrySnapshot::load(path)?, Arc::new(SystemClock))
    }

    /// Save the current state to a snapshot file.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.snapshot().save(path)
    }
}
