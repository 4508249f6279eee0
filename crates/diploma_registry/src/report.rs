//! Human-facing verification summary of a single fingerprint.

use crate::registry::DiplomaRegistry;
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub fingerprint: Fingerprint,
    pub verification: Verification,
    /// Diplomas held by the same recipient, 0 when not found
    pub recipient_diplomas: usize,
    pub registry_total: u64,
}

impl VerificationReport {
    /// Assemble the report from a single consistent view of the registry.
    pub fn build(registry: &DiplomaRegistry, fingerprint: Fingerprint) -> Self {
        registry.read_state(|state| {
            let verification = state
                .store
                .get(&fingerprint)
                .map(Verification::from)
                .unwrap_or_default();
            let recipient_diplomas = if verification.exists {
                state.index.count_of(&verification.recipient)
            } else {
                0
            };

            Self {
                fingerprint,
                verification,
                recipient_diplomas,
                registry_total: state.index.total_count(),
            }
        })
    }

    pub fn verified(&self) -> bool {
        self.verification.exists
    }

    /// Floor of the mean score; `None` when there are no scores.
    pub fn average_score(&self) -> Option<u64> {
        let scores = &self.verification.scores;
        if scores.is_empty() {
            return None;
        }
        let sum: u128 = scores.iter().map(|s| u128::from(*s)).sum();
        Some((sum / scores.len() as u128) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: Identity = Identity([0xA1; 20]);
    const R1: Identity = Identity([0x11; 20]);

    #[test]
    fn report_for_issued_diploma() {
        let registry = DiplomaRegistry::new(ADMIN).unwrap();
        let fp = Fingerprint::new([0xAA; 32]);
        registry.issue(&ADMIN, fp, R1, vec![85, 90, 88]).unwrap();
        registry
            .issue(&ADMIN, Fingerprint::new([0xAB; 32]), R1, vec![])
            .unwrap();

        let report = VerificationReport::build(&registry, fp);
        assert!(report.verified());
        assert_eq!(report.recipient_diplomas, 2);
        assert_eq!(report.registry_total, 2);
        assert_eq!(report.average_score(), Some(87));
    }

    #[test]
    fn report_for_unknown_fingerprint() {
        let registry = DiplomaRegistry::new(ADMIN).unwrap();
        let report = VerificationReport::build(&registry, Fingerprint::new([0xBB; 32]));
        assert!(!report.verified());
        assert_eq!(report.recipient_diplomas, 0);
        assert_eq!(report.average_score(), None);
    }

    #[test]
    fn average_does_not_overflow() {
        let report = VerificationReport {
            fingerprint: Fingerprint::new([1; 32]),
            verification: Verification {
                exists: true,
                recipient: R1,
                issued_at: 1,
                scores: vec![u64::MAX, u64::MAX],
            },
            recipient_diplomas: 1,
            registry_total: 1,
        };
        assert_eq!(report.average_score(), Some(u64::MAX));
    }

    #[test]
    fn report_counts_agree_under_concurrent_issues() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(DiplomaRegistry::new(ADMIN).unwrap());
        let first = Fingerprint::new([0xFF; 32]);
        registry.issue(&ADMIN, first, R1, vec![1]).unwrap();

        let writer = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..500u32 {
                    let mut bytes = [0u8; 32];
                    bytes[..4].copy_from_slice(&i.to_be_bytes());
                    bytes[31] = 1;
                    registry
                        .issue(&ADMIN, Fingerprint::new(bytes), R1, vec![])
                        .unwrap();
                }
            })
        };

        // every diploma goes to R1, so a consistent view has equal counts
        for _ in 0..500 {
            let report = VerificationReport::build(&registry, first);
            assert_eq!(report.recipient_diplomas as u64, report.registry_total);
        }
        writer.join().unwrap();

        let report = VerificationReport::build(&registry, first);
        assert_eq!(report.registry_total, 501);
    }
}
