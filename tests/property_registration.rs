/// Property-based tests for override registration
///
/// These tests use proptest to generate registration sequences and verify
/// invariants that should hold for all of them. The global container is
/// shared, so each property drives its own runner inside a serial test.

use injectable::{container, CachedScope, Scope};
use proptest::prelude::*;
use proptest::test_runner::TestRunner;
use serial_test::serial;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
struct TestService {
    id: u32,
    name: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct OtherService(u32);

#[test]
#[serial]
fn last_registration_wins() {
    let mut runner = TestRunner::default();
    runner
        .run(&prop::collection::vec(0u32..1000, 1..10), |ids| {
            container().reset();
            for id in &ids {
                let id = *id;
                container().register(move || TestService { id, name: format!("service_{}", id) });
            }

            let last = *ids.last().unwrap();
            for _ in 0..3 {
                let resolved = container().resolve(|| TestService { id: u32::MAX, name: String::new() });
                prop_assert_eq!(resolved.id, last);
                prop_assert_eq!(resolved.name, format!("service_{}", last));
            }
            Ok(())
        })
        .unwrap();
    container().reset();
}

#[test]
#[serial]
fn reset_restores_every_default() {
    let mut runner = TestRunner::default();
    runner
        .run(&(any::<bool>(), any::<bool>(), 0u32..100), |(first, second, value)| {
            container().reset();
            if first {
                container().register(move || TestService { id: value, name: "mock".to_string() });
            }
            if second {
                container().register(move || OtherService(value));
            }

            container().reset();
            let a = container().resolve(|| TestService { id: u32::MAX, name: "default".to_string() });
            let b = container().resolve(|| OtherService(u32::MAX));
            prop_assert_eq!(a.name.as_str(), "default");
            prop_assert_eq!(b, OtherService(u32::MAX));
            Ok(())
        })
        .unwrap();
}

#[test]
#[serial]
fn registrations_for_other_keys_do_not_interfere() {
    let mut runner = TestRunner::default();
    runner
        .run(&(0u32..1000, 0u32..1000), |(a, b)| {
            container().reset();
            container().register(move || OtherService(a));
            container().register(move || TestService { id: b, name: String::new() });

            prop_assert_eq!(container().resolve(|| OtherService(0)).0, a);
            prop_assert_eq!(container().resolve(|| TestService { id: 0, name: String::new() }).id, b);
            Ok(())
        })
        .unwrap();
    container().reset();
}

proptest! {
    #[test]
    fn cached_scope_factory_runs_once_per_reset(resets in 0usize..5, hits in 1usize..20) {
        let scope = CachedScope::new();
        let mut built = 0usize;

        for _ in 0..=resets {
            let first = scope.obtain(|| { built += 1; Arc::new(built) });
            for _ in 0..hits {
                let again = scope.obtain(|| Arc::new(usize::MAX));
                prop_assert!(Arc::ptr_eq(&first, &again));
            }
            scope.reset();
        }

        prop_assert_eq!(built, resets + 1);
    }
}
