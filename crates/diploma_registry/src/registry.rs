//! Diploma registry engine
//!
//! Composes the record store, the recipient index and the admin gate behind a
//! single lock so that "check duplicate, insert, index, notify" is one atomic
//! step.

use crate::access::AccessController;
use crate::clock::{Clock, SystemClock};
use crate::errors::*;
use crate::events::{EventSink, RegistryEvent};
use crate::index::RecipientIndex;
use crate::store::RecordStore;
use crate::types::*;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub(crate) struct RegistryState {
    pub(crate) access: AccessController,
    pub(crate) store: RecordStore,
    pub(crate) index: RecipientIndex,
    /// Latest issuance timestamp, keeps `issued_at` non-decreasing
    pub(crate) last_issued_at: u64,
}

/// Diploma issuance registry.
///
/// Mutations are admin-gated; reads are public and never fail. The registry is
/// `Send + Sync` and meant to be shared through an `Arc`.
pub struct DiplomaRegistry {
    state: RwLock<RegistryState>,
    clock: Arc<dyn Clock>,
    sinks: Vec<Arc<dyn EventSink>>,
}

impl DiplomaRegistry {
    /// Create an empty registry administered by `admin`.
    pub fn new(admin: Identity) -> Result<Self> {
        Self::with_clock(admin, Arc::new(SystemClock))
    }

    /// Create an empty registry with an explicit time source.
    pub fn with_clock(admin: Identity, clock: Arc<dyn Clock>) -> Result<Self> {
        let access = AccessController::new(admin)?;
        info!(%admin, "Diploma registry initialized");
        Ok(Self::from_state(
            RegistryState {
                access,
                store: RecordStore::new(),
                index: RecipientIndex::new(),
                last_issued_at: 0,
            },
            clock,
        ))
    }

    pub(crate) fn from_state(state: RegistryState, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(state),
            clock,
            sinks: Vec::new(),
        }
    }

    /// Attach an event sink. Sinks see every event committed afterwards.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Record a new diploma.
    ///
    /// Checks run in order and the first failure wins: caller is admin,
    /// fingerprint non-zero, recipient non-zero, fingerprint unused.
    pub fn issue(
        &self,
        caller: &Identity,
        fingerprint: Fingerprint,
        recipient: Identity,
        scores: Vec<u64>,
    ) -> Result<DiplomaRecord> {
        let mut state = self.state.write();

        if let Err(err) = state.access.require_admin(caller) {
            warn!(%caller, %fingerprint, "Rejected diploma issuance from non-admin");
            return Err(err);
        }
        if fingerprint.is_zero() {
            return Err(RegistryError::InvalidFingerprint);
        }
        if recipient.is_zero() {
            return Err(RegistryError::InvalidRecipient);
        }

        let issued_at = self.clock.now().max(state.last_issued_at);
        let record = DiplomaRecord {
            fingerprint,
            recipient,
            issued_at,
            scores,
            exists: true,
        };

        if !state.store.insert(record.clone()) {
            debug!(%fingerprint, "Duplicate diploma fingerprint");
            return Err(RegistryError::DuplicateRecord { fingerprint });
        }
        state.index.append(recipient, fingerprint);
        state.last_issued_at = issued_at;

        info!(
            %fingerprint,
            %recipient,
            issued_at,
            total = state.index.total_count(),
            "Diploma issued"
        );
        self.emit(&RegistryEvent::DiplomaIssued {
            fingerprint,
            recipient,
        });

        Ok(record)
    }

    /// Hand admin authority to `new_admin`.
    pub fn transfer_admin(&self, caller: &Identity, new_admin: Identity) -> Result<()> {
        let mut state = self.state.write();
        let previous = state.access.transfer(caller, new_admin).map_err(|err| {
            warn!(%caller, %new_admin, error = %err, "Admin transfer rejected");
            err
        })?;

        info!(%previous, current = %new_admin, "Registry admin changed");
        self.emit(&RegistryEvent::AdminChanged {
            previous,
            current: new_admin,
        });
        Ok(())
    }

    /// Current admin identity
    pub fn admin(&self) -> Identity {
        self.state.read().access.admin()
    }

    /// Public verification of a fingerprint. Absent records yield
    /// `exists == false` with zero/empty fields.
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Verification {
        let state = self.state.read();
        state
            .store
            .get(fingerprint)
            .map(Verification::from)
            .unwrap_or_default()
    }

    /// Full stored record, or the all-zero default record if absent.
    pub fn full_record(&self, fingerprint: &Fingerprint) -> DiplomaRecord {
        let state = self.state.read();
        state.store.get(fingerprint).cloned().unwrap_or_default()
    }

    /// Fingerprints issued to `recipient`, oldest first.
    pub fn diplomas_of(&self, recipient: &Identity) -> Vec<Fingerprint> {
        self.state.read().index.diplomas_of(recipient)
    }

    /// Total number of diplomas ever issued.
    pub fn total_count(&self) -> u64 {
        self.state.read().index.total_count()
    }

    /// Run `f` against a consistent view of the whole state.
    pub(crate) fn read_state<T>(&self, f: impl FnOnce(&RegistryState) -> T) -> T {
        f(&*self.state.read())
    }

    fn emit(&self, event: &RegistryEvent) {
        for sink in &self.sinks {
            sink.publish(event);
        }
    }
}

impl fmt::Debug for DiplomaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("DiplomaRegistry")
            .field("admin", &state.access.admin())
            .field("total", &state.index.total_count())
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
