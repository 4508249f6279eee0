//! Recipient → fingerprints secondary index.

use crate::types::{Fingerprint, Identity};
use std::collections::HashMap;

/// Ordered list of fingerprints issued to each recipient, plus the global
/// issuance count.
///
/// Only the registry appends, and only after the record store accepted the
/// fingerprint, so entries never repeat.
#[derive(Debug, Default, Clone)]
pub struct RecipientIndex {
    by_recipient: HashMap<Identity, Vec<Fingerprint>>,
    total: u64,
}

impl RecipientIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, recipient: Identity, fingerprint: Fingerprint) {
        self.by_recipient
            .entry(recipient)
            .or_default()
            .push(fingerprint);
        self.total += 1;
    }

    /// Fingerprints issued to `recipient`, oldest first.
    pub fn diplomas_of(&self, recipient: &Identity) -> Vec<Fingerprint> {
        self.by_recipient.get(recipient).cloned().unwrap_or_default()
    }

    /// Number of diplomas issued to `recipient`.
    pub fn count_of(&self, recipient: &Identity) -> usize {
        self.by_recipient.get(recipient).map_or(0, Vec::len)
    }

    pub fn total_count(&self) -> u64 {
        self.total
    }

    /// Number of distinct recipients.
    pub fn recipients(&self) -> usize {
        self.by_recipient.len()
    }
}
