//! # Service Registry
//!
//! Thread-safe, type-keyed storage for registered service values.
//!
//! ## Overview
//!
//! [`ServiceRegistry`] is the core registration/resolution engine. Each
//! abstraction type owns one slot, which is either a single value or an
//! insertion-ordered multi-value set. Plain [`register`](ServiceRegistry::register)
//! always overwrites the slot; [`multi_register`](ServiceRegistry::multi_register)
//! appends, promoting a single slot to a multi-value one on the second call.
//! Successor resolution walks a multi-value slot in registration order.
//!
//! ## Key Features
//!
//! - **Type-keyed slots** with single/multi-value state per abstraction type
//! - **Successor resolution** (`resolve_after`) over multi-value slots, O(1)
//! - **Capability fan-out** registration under trait-object keys
//! - **Coarse-grained locking**: one mutex per registry, every call
//!   linearized against every other
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use stowage::{Registration, ServiceRegistry};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".into()
//!     }
//! }
//!
//! let registry = ServiceRegistry::new();
//! let service = Arc::new(English);
//! registry.register(Registration::of(service.clone()).implements::<dyn Greeter>(service));
//!
//! let greeter = registry.resolve::<dyn Greeter>().unwrap();
//! assert_eq!(greeter.greet(), "hello");
//! ```

use std::collections::hash_map::{Entry, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::{RegistryError, Result};
use crate::key::TypeKey;
use crate::registry::entry::{identity_of, ServiceEntry};
use crate::registry::ordered_set::OrderedValueSet;

/// Per-type storage: a lone value, or the ordered set a second
/// multi-registration promotes it into. Once multi-valued, a slot stays
/// multi-valued until the type is fully released.
enum Slot {
    Single(ServiceEntry),
    Multiple(OrderedValueSet<ServiceEntry>),
}

/// One value bound for registration, together with the capability keys it
/// should fan out to.
///
/// Rust has no runtime reflection to enumerate implemented traits, so the
/// fan-out set is declared at the call site: `of` binds the concrete type,
/// each `implements` adds a trait-object key. A bare `Arc` converts into a
/// single-key registration.
pub struct Registration {
    entries: Vec<(TypeKey, ServiceEntry)>,
}

impl Registration {
    /// Binds `value` under the key of `T`.
    pub fn of<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            entries: vec![(TypeKey::of::<T>(), ServiceEntry::new(value))],
        }
    }

    /// Additionally binds `value` under the key of capability `C`.
    ///
    /// Pass the same `Arc` coerced to the trait object, so all fan-out
    /// entries share one identity.
    pub fn implements<C: ?Sized + Send + Sync + 'static>(mut self, value: Arc<C>) -> Self {
        self.entries
            .push((TypeKey::of::<C>(), ServiceEntry::new(value)));
        self
    }
}

impl<T: ?Sized + Send + Sync + 'static> From<Arc<T>> for Registration {
    fn from(value: Arc<T>) -> Self {
        Registration::of(value)
    }
}

/// Counts reported by [`ServiceRegistry::stats`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    pub registered_types: usize,
    pub multi_value_types: usize,
    pub total_values: usize,
}

/// The concurrency-safe mapping from abstraction type to registered values.
///
/// Callers own registry instances and pass them to the components that need
/// them; there is no process-wide table. Values are held as `Arc` clones and
/// live until released. Removal and successor navigation use `Arc`
/// allocation identity, never structural equality.
#[derive(Default)]
pub struct ServiceRegistry {
    slots: Mutex<HashMap<TypeKey, Slot>>,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every key of `registration`, unconditionally replacing
    /// whatever each key held, single or multi-valued alike.
    pub fn register(&self, registration: impl Into<Registration>) {
        let mut slots = self.slots.lock();
        for (key, entry) in registration.into().entries {
            debug!("Registered value for type '{}'", key.name());
            slots.insert(key, Slot::Single(entry));
        }
    }

    /// Registers every key of `registration` additively: a vacant key gets a
    /// single slot, an occupied one is promoted or appended to in
    /// registration order.
    pub fn multi_register(&self, registration: impl Into<Registration>) {
        let mut slots = self.slots.lock();
        for (key, entry) in registration.into().entries {
            debug!("Multi-registered value for type '{}'", key.name());
            match slots.entry(key) {
                Entry::Vacant(vacant) => {
                    vacant.insert(Slot::Single(entry));
                }
                Entry::Occupied(occupied) => {
                    let mut set = match occupied.remove() {
                        Slot::Multiple(set) => set,
                        Slot::Single(prior) => {
                            let mut set = OrderedValueSet::new();
                            set.push(prior.identity(), prior);
                            set
                        }
                    };
                    set.push(entry.identity(), entry);
                    slots.insert(key, Slot::Multiple(set));
                }
            }
        }
    }

    /// The value registered for `T`: the lone value of a single slot, or the
    /// earliest-registered value of a multi-value slot.
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let slots = self.slots.lock();
        let entry = match slots.get(&TypeKey::of::<T>())? {
            Slot::Single(entry) => entry,
            Slot::Multiple(set) => set.first()?,
        };
        trace!("Resolved value for type '{}'", entry.type_name());
        entry.resolve::<T>()
    }

    /// Like [`resolve`](Self::resolve), but absence is an error.
    pub fn resolve_required<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let not_registered = || RegistryError::NotRegistered(std::any::type_name::<T>());
        let slots = self.slots.lock();
        let entry = match slots.get(&TypeKey::of::<T>()).ok_or_else(not_registered)? {
            Slot::Single(entry) => entry,
            Slot::Multiple(set) => set.first().ok_or_else(not_registered)?,
        };
        entry.downcast::<T>()
    }

    /// The value multi-registered immediately after `after`, in registration
    /// order. Absent and single slots have no successors.
    pub fn resolve_after<T: ?Sized + Send + Sync + 'static>(
        &self,
        after: &Arc<T>,
    ) -> Option<Arc<T>> {
        let slots = self.slots.lock();
        match slots.get(&TypeKey::of::<T>())? {
            Slot::Single(_) => None,
            Slot::Multiple(set) => set.after(identity_of(after))?.resolve::<T>(),
        }
    }

    /// Drops every value registered for `T`, whatever the slot kind.
    pub fn release<T: ?Sized + 'static>(&self) {
        if self.slots.lock().remove(&TypeKey::of::<T>()).is_some() {
            debug!("Released all values for type '{}'", TypeKey::of::<T>().name());
        }
    }

    /// Drops the one value identified by `value` from `T`'s slot. A single
    /// slot is removed only when the identity matches; a multi-value slot
    /// that empties out is removed entirely, so no empty buckets persist.
    ///
    /// Release is per-resolved-type only: entries fanned out to capability
    /// keys at registration are left in place and must be released under
    /// their own keys.
    pub fn release_value<T: ?Sized + Send + Sync + 'static>(&self, value: &Arc<T>) {
        let mut slots = self.slots.lock();
        let key = TypeKey::of::<T>();
        let identity = identity_of(value);
        let drop_slot = match slots.get_mut(&key) {
            None => return,
            Some(Slot::Single(entry)) => entry.identity() == identity,
            Some(Slot::Multiple(set)) => {
                set.remove(identity);
                set.is_empty()
            }
        };
        if drop_slot {
            slots.remove(&key);
            debug!("Released last value for type '{}'", key.name());
        }
    }

    /// Registration counts, for diagnostics.
    pub fn stats(&self) -> RegistryStats {
        let slots = self.slots.lock();
        let mut stats = RegistryStats {
            registered_types: slots.len(),
            multi_value_types: 0,
            total_values: 0,
        };
        for slot in slots.values() {
            match slot {
                Slot::Single(_) => stats.total_values += 1,
                Slot::Multiple(set) => {
                    stats.multi_value_types += 1;
                    stats.total_values += set.len();
                }
            }
        }
        stats
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Transport: Send + Sync {
        fn scheme(&self) -> &'static str;
    }

    trait Reloadable: Send + Sync {}

    #[derive(Debug, PartialEq)]
    struct Http {
        port: u16,
    }

    impl Transport for Http {
        fn scheme(&self) -> &'static str {
            "http"
        }
    }

    impl Reloadable for Http {}

    fn http(port: u16) -> Arc<Http> {
        Arc::new(Http { port })
    }

    #[test]
    fn test_register_resolve_release_roundtrip() {
        let registry = ServiceRegistry::new();
        let value = http(80);
        registry.register(value.clone());

        let resolved = registry.resolve::<Http>().unwrap();
        assert!(Arc::ptr_eq(&value, &resolved));

        registry.release::<Http>();
        assert!(registry.resolve::<Http>().is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_overwrites_existing_slot() {
        let registry = ServiceRegistry::new();
        registry.register(http(80));
        registry.register(http(8080));
        assert_eq!(registry.resolve::<Http>().unwrap().port, 8080);
        assert_eq!(registry.stats().total_values, 1);
    }

    #[test]
    fn test_register_replaces_multi_value_slot() {
        let registry = ServiceRegistry::new();
        registry.multi_register(http(1));
        registry.multi_register(http(2));
        registry.register(http(3));
        assert_eq!(registry.resolve::<Http>().unwrap().port, 3);
        assert_eq!(registry.stats().multi_value_types, 0);
    }

    #[test]
    fn test_multi_register_resolves_in_insertion_order() {
        let registry = ServiceRegistry::new();
        let (a, b) = (http(1), http(2));
        registry.multi_register(a.clone());
        registry.multi_register(b.clone());

        let first = registry.resolve::<Http>().unwrap();
        assert!(Arc::ptr_eq(&first, &a));
        let second = registry.resolve_after(&first).unwrap();
        assert!(Arc::ptr_eq(&second, &b));
        assert!(registry.resolve_after(&second).is_none());
    }

    #[test]
    fn test_register_then_multi_register_promotes() {
        let registry = ServiceRegistry::new();
        let (a, b) = (http(1), http(2));
        registry.register(a.clone());
        registry.multi_register(b.clone());

        assert!(Arc::ptr_eq(&registry.resolve::<Http>().unwrap(), &a));
        assert!(Arc::ptr_eq(&registry.resolve_after(&a).unwrap(), &b));
        assert_eq!(registry.stats().multi_value_types, 1);
    }

    #[test]
    fn test_single_slot_has_no_successor() {
        let registry = ServiceRegistry::new();
        let value = http(80);
        registry.register(value.clone());
        assert!(registry.resolve_after(&value).is_none());
    }

    #[test]
    fn test_release_from_multi_bridges_successor_chain() {
        let registry = ServiceRegistry::new();
        let (a, b, c) = (http(1), http(2), http(3));
        registry.multi_register(a.clone());
        registry.multi_register(b.clone());
        registry.multi_register(c.clone());

        registry.release_value(&b);
        assert!(Arc::ptr_eq(&registry.resolve_after(&a).unwrap(), &c));
        assert!(registry.resolve_after(&b).is_none());
    }

    #[test]
    fn test_releasing_last_value_collapses_the_bucket() {
        let registry = ServiceRegistry::new();
        let a = http(1);
        registry.multi_register(a.clone());
        registry.multi_register(http(2));
        registry.release_value(&a);
        let b = registry.resolve::<Http>().unwrap();
        registry.release_value(&b);
        assert!(registry.is_empty());

        // A later registration starts from scratch as a single slot, not an
        // append to a stale bucket.
        let fresh = http(3);
        registry.register(fresh.clone());
        assert!(registry.resolve_after(&fresh).is_none());
        assert_eq!(registry.stats().multi_value_types, 0);
    }

    #[test]
    fn test_release_value_ignores_identity_mismatch_on_single_slot() {
        let registry = ServiceRegistry::new();
        registry.register(http(80));
        registry.release_value(&http(80));
        assert!(registry.resolve::<Http>().is_some());
    }

    #[test]
    fn test_capability_fanout_resolves_by_trait_key() {
        let registry = ServiceRegistry::new();
        let value = http(80);
        registry.register(
            Registration::of(value.clone())
                .implements::<dyn Transport>(value.clone())
                .implements::<dyn Reloadable>(value),
        );

        assert_eq!(registry.resolve::<dyn Transport>().unwrap().scheme(), "http");
        assert!(registry.resolve::<dyn Reloadable>().is_some());
        assert_eq!(registry.resolve::<Http>().unwrap().port, 80);
        assert_eq!(registry.stats().registered_types, 3);
    }

    #[test]
    fn test_release_value_leaves_fanout_entries_in_place() {
        let registry = ServiceRegistry::new();
        let value = http(80);
        registry
            .register(Registration::of(value.clone()).implements::<dyn Transport>(value.clone()));

        registry.release_value(&value);
        assert!(registry.resolve::<Http>().is_none());
        // Fan-out release is asymmetric: the trait-key entry survives.
        assert!(registry.resolve::<dyn Transport>().is_some());
    }

    #[test]
    fn test_release_through_trait_object_identity() {
        let registry = ServiceRegistry::new();
        let value = http(80);
        registry
            .register(Registration::of(value.clone()).implements::<dyn Transport>(value.clone()));

        let as_transport: Arc<dyn Transport> = registry.resolve::<dyn Transport>().unwrap();
        registry.release_value(&as_transport);
        assert!(registry.resolve::<dyn Transport>().is_none());
        assert!(registry.resolve::<Http>().is_some());
    }

    #[test]
    fn test_multi_register_fanout_appends_under_every_key() {
        let registry = ServiceRegistry::new();
        let (a, b) = (http(1), http(2));
        registry
            .multi_register(Registration::of(a.clone()).implements::<dyn Transport>(a.clone()));
        registry
            .multi_register(Registration::of(b.clone()).implements::<dyn Transport>(b.clone()));

        let first = registry.resolve::<dyn Transport>().unwrap();
        assert_eq!(identity_of(&first), identity_of(&a));
        let second = registry.resolve_after(&first).unwrap();
        assert_eq!(identity_of(&second), identity_of(&b));
    }

    #[test]
    fn test_resolve_required_reports_absence() {
        let registry = ServiceRegistry::new();
        let err = registry.resolve_required::<Http>().unwrap_err();
        assert!(matches!(err, RegistryError::NotRegistered(_)));

        registry.register(http(80));
        assert_eq!(registry.resolve_required::<Http>().unwrap().port, 80);
    }

    #[test]
    fn test_resolve_after_unknown_value_is_absent() {
        let registry = ServiceRegistry::new();
        registry.multi_register(http(1));
        registry.multi_register(http(2));
        assert!(registry.resolve_after(&http(99)).is_none());
    }
}
