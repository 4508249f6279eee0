//! Canonical fingerprint → record storage.

use crate::types::{DiplomaRecord, Fingerprint};
use std::collections::HashMap;

/// Append-only record map. Records are never replaced or removed.
#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    records: HashMap<Fingerprint, DiplomaRecord>,
    /// Creation order, used for snapshots
    order: Vec<Fingerprint>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.records
            .get(fingerprint)
            .is_some_and(|record| record.exists)
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&DiplomaRecord> {
        self.records.get(fingerprint).filter(|record| record.exists)
    }

    /// Insert a new record. Returns `false` and leaves the store untouched if
    /// the fingerprint is already taken.
    pub(crate) fn insert(&mut self, record: DiplomaRecord) -> bool {
        if self.contains(&record.fingerprint) {
            return false;
        }
        self.order.push(record.fingerprint);
        self.records.insert(record.fingerprint, record);
        true
    }

    /// Records in the order they were created.
    pub fn iter_in_order(&self) -> impl Iterator<Item = &DiplomaRecord> + '_ {
        self.order.iter().filter_map(|fp| self.records.get(fp))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
