//! Error types for the diploma registry

use crate::types::{Fingerprint, Identity};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Unauthorized: {caller} is not the registry admin")]
    Unauthorized { caller: Identity },

    #[error("Diploma fingerprint cannot be zero")]
    InvalidFingerprint,

    #[error("Recipient identity cannot be zero")]
    InvalidRecipient,

    #[error("Diploma already exists: {fingerprint}")]
    DuplicateRecord { fingerprint: Fingerprint },

    #[error("Admin identity cannot be zero")]
    InvalidAdmin,

    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt registry snapshot: {0}")]
    CorruptSnapshot(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
