//! Cross-module registry properties: ordered multi-registration drains, and
//! linearizability of concurrent mutation against resolution.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use proptest::prelude::*;
use stowage::{KeyedRegistry, ServiceRegistry};

#[derive(Debug)]
struct Item {
    id: u64,
}

/// Walks the whole successor chain for `Item`, earliest-registered first.
fn drain(registry: &ServiceRegistry) -> Vec<u64> {
    let mut out = Vec::new();
    let mut current = registry.resolve::<Item>();
    while let Some(item) = current {
        out.push(item.id);
        current = registry.resolve_after(&item);
    }
    out
}

proptest! {
    /// Property: multi-registered values drain in exact insertion order.
    #[test]
    fn multi_registered_values_drain_in_insertion_order(
        ids in prop::collection::vec(any::<u64>(), 0..32),
    ) {
        let registry = ServiceRegistry::new();
        for &id in &ids {
            registry.multi_register(Arc::new(Item { id }));
        }
        prop_assert_eq!(drain(&registry), ids);
    }

    /// Property: releasing any subset of values leaves the remaining chain
    /// in insertion order with no gaps or leftovers.
    #[test]
    fn released_values_vanish_from_the_successor_chain(
        ids in prop::collection::vec(any::<u64>(), 1..24),
        removals in prop::collection::vec(any::<prop::sample::Index>(), 0..8),
    ) {
        let registry = ServiceRegistry::new();
        let mut values = Vec::new();
        for &id in &ids {
            let value = Arc::new(Item { id });
            registry.multi_register(value.clone());
            values.push(value);
        }

        let mut removed = HashSet::new();
        for index in removals {
            let i = index.index(values.len());
            if removed.insert(i) {
                registry.release_value(&values[i]);
            }
        }

        let expected: Vec<u64> = values
            .iter()
            .enumerate()
            .filter(|(i, _)| !removed.contains(i))
            .map(|(_, value)| value.id)
            .collect();
        prop_assert_eq!(registry.is_empty(), expected.is_empty());
        prop_assert_eq!(drain(&registry), expected);
    }
}

#[test]
fn concurrent_multi_registration_loses_nothing() {
    common::init_tracing();
    const THREADS: u64 = 8;
    const PER_THREAD: u64 = 64;

    let registry = Arc::new(ServiceRegistry::new());
    let mut handles = Vec::new();
    for t in 0..THREADS {
        let registry = Arc::clone(&registry);
        handles.push(thread::spawn(move || {
            for i in 0..PER_THREAD {
                registry.multi_register(Arc::new(Item {
                    id: t * PER_THREAD + i,
                }));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // Single-threaded drain must observe every value exactly once.
    let mut seen = drain(&registry);
    seen.sort_unstable();
    let expected: Vec<u64> = (0..THREADS * PER_THREAD).collect();
    assert_eq!(seen, expected);
}

#[test]
fn resolution_is_safe_during_concurrent_mutation() {
    common::init_tracing();
    let registry = Arc::new(ServiceRegistry::new());
    registry.register(Arc::new(Item { id: 0 }));

    let writer = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for id in 1..500 {
                registry.register(Arc::new(Item { id }));
            }
        })
    };
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for _ in 0..500 {
                    // The slot is only ever replaced, never absent.
                    assert!(registry.resolve::<Item>().is_some());
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(registry.resolve::<Item>().unwrap().id, 499);
}

#[test]
fn keyed_registrations_from_many_threads_all_land() {
    common::init_tracing();
    let registry = Arc::new(KeyedRegistry::<u64>::new());
    let handles: Vec<_> = (0..8u64)
        .map(|key| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.register(Arc::new(Item { id: key }), key))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for key in 0..8u64 {
        assert_eq!(registry.resolve::<Item>(&key).unwrap().id, key);
    }
}
