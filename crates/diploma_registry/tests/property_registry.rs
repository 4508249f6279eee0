use diploma_registry::*;
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

// Property-based tests for the registry's uniqueness, authorization and
// indexing invariants.

const ADMIN: Identity = Identity([0xA1; 20]);

fn non_zero_fingerprint() -> impl Strategy<Value = Fingerprint> {
    prop::array::uniform32(any::<u8>())
        .prop_filter("fingerprint must be non-zero", |b| b.iter().any(|x| *x != 0))
        .prop_map(Fingerprint::new)
}

fn non_zero_identity() -> impl Strategy<Value = Identity> {
    prop::array::uniform20(any::<u8>())
        .prop_filter("identity must be non-zero", |b| b.iter().any(|x| *x != 0))
        .prop_map(Identity::new)
}

fn scores() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(any::<u64>(), 0..8)
}

fn registry_at(now: u64) -> DiplomaRegistry {
    DiplomaRegistry::with_clock(ADMIN, Arc::new(ManualClock::new(now))).unwrap()
}

proptest! {
    #[test]
    fn issued_diploma_is_verifiable(
        fingerprint in non_zero_fingerprint(),
        recipient in non_zero_identity(),
        scores in scores(),
        now in 1u64..=4_000_000_000,
    ) {
        let registry = registry_at(now);
        registry.issue(&ADMIN, fingerprint, recipient, scores.clone()).unwrap();

        let verification = registry.lookup(&fingerprint);
        prop_assert_eq!(verification, Verification {
            exists: true,
            recipient,
            issued_at: now,
            scores,
        });
    }

    #[test]
    fn reissue_is_always_duplicate(
        fingerprint in non_zero_fingerprint(),
        first in non_zero_identity(),
        second in non_zero_identity(),
        first_scores in scores(),
        second_scores in scores(),
    ) {
        let registry = registry_at(42);
        let original = registry.issue(&ADMIN, fingerprint, first, first_scores).unwrap();

        let err = registry.issue(&ADMIN, fingerprint, second, second_scores).unwrap_err();
        prop_assert!(matches!(err, RegistryError::DuplicateRecord { .. }), "unexpected error variant");
        prop_assert_eq!(registry.full_record(&fingerprint), original);
        prop_assert_eq!(registry.total_count(), 1);
    }

    #[test]
    fn non_admin_never_issues(
        caller in non_zero_identity(),
        fingerprint in non_zero_fingerprint(),
        recipient in non_zero_identity(),
    ) {
        prop_assume!(caller != ADMIN);
        let registry = registry_at(1);

        let err = registry.issue(&caller, fingerprint, recipient, vec![1]).unwrap_err();
        prop_assert!(matches!(err, RegistryError::Unauthorized { .. }), "unexpected error variant");
        prop_assert!(!registry.lookup(&fingerprint).exists);
        prop_assert_eq!(registry.total_count(), 0);
    }

    #[test]
    fn index_mirrors_successful_issues(
        ops in prop::collection::vec((0u8..16, 0usize..3), 1..40),
    ) {
        let recipients = [
            Identity::new([1u8; 20]),
            Identity::new([2u8; 20]),
            Identity::new([3u8; 20]),
        ];
        let registry = registry_at(7);
        let mut seen = HashSet::new();
        let mut expected: Vec<Vec<Fingerprint>> = vec![Vec::new(); recipients.len()];

        for (seed, who) in ops {
            let fingerprint = Fingerprint::new([seed.wrapping_add(1); 32]);
            let result = registry.issue(&ADMIN, fingerprint, recipients[who], Vec::new());
            if seen.insert(fingerprint) {
                prop_assert!(result.is_ok());
                expected[who].push(fingerprint);
            } else {
                let is_duplicate = matches!(result, Err(RegistryError::DuplicateRecord { .. }));
                prop_assert!(is_duplicate);
            }
        }

        for (who, recipient) in recipients.iter().enumerate() {
            prop_assert_eq!(registry.diplomas_of(recipient), expected[who].clone());
        }
        prop_assert_eq!(registry.total_count(), seen.len() as u64);
    }
}
