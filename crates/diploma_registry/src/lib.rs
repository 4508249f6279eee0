//! Diploma Issuance Registry
//!
//! An admin records the fingerprint of a credential together with its
//! recipient and scores; anyone can later look the fingerprint up and get an
//! authoritative answer about whether, when and to whom it was issued.
//! Records are immutable once issued.

pub mod access;
pub mod clock;
pub mod errors;
pub mod events;
pub mod fingerprint;
pub mod index;
pub mod registry;
pub mod report;
pub mod snapshot;
pub mod store;
pub mod types;

pub use access::AccessController;
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::*;
pub use events::{BroadcastEventSink, EventSink, MemoryEventSink, RegistryEvent, TracingEventSink};
pub use fingerprint::{compute_fingerprint, hash_document, DiplomaDetails, DiplomaMetadata};
pub use index::RecipientIndex;
pub use registry::DiplomaRegistry;
pub use report::VerificationReport;
pub use snapshot::{RegistrySnapshot, SNAPSHOT_VERSION};
pub use store::RecordStore;
pub use types::*;
