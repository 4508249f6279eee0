//! Credential fingerprint helper.
//!
//! The registry accepts any non-zero fingerprint; this module only offers the
//! conventional derivation used by issuers: Keccak-256 over the packed
//! encoding of the document hash and the descriptive fields, with no length
//! prefixes between them.

use crate::types::Fingerprint;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

/// Optional descriptive fields appended to the fingerprint input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiplomaDetails {
    pub major: String,
    pub gpa: String,
    pub honors: String,
}

/// Off-registry description of a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiplomaMetadata {
    /// Hash of the credential document (e.g. the diploma PDF)
    pub document_hash: [u8; 32],
    pub student_id: String,
    /// `YYYY-MM-DD`
    pub graduation_date: String,
    pub degree: String,
    pub details: Option<DiplomaDetails>,
}

/// Keccak-256 of raw document bytes.
pub fn hash_document(bytes: &[u8]) -> [u8; 32] {
    Keccak256::digest(bytes).into()
}

/// Derive the registry fingerprint for `metadata`.
pub fn compute_fingerprint(metadata: &DiplomaMetadata) -> Fingerprint {
    let mut hasher = Keccak256::new();
    hasher.update(metadata.document_hash);
    hasher.update(metadata.student_id.as_bytes());
    hasher.update(metadata.graduation_date.as_bytes());
    hasher.update(metadata.degree.as_bytes());
    if let Some(details) = &metadata.details {
        hasher.update(details.major.as_bytes());
        hasher.update(details.gpa.as_bytes());
        hasher.update(details.honors.as_bytes());
    }
    Fingerprint::new(hasher.finalize().into())
}
