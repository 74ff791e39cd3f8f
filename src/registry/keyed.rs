//! # Keyed Registries
//!
//! Registries partitioned by an auxiliary key within each abstraction type.
//!
//! ## Overview
//!
//! [`KeyedRegistry`] keeps one inner key-to-value map per abstraction type;
//! registration is last-writer-wins within a key partition. Lookup is exact
//! by default, with [`resolve_with`](KeyedRegistry::resolve_with) accepting a
//! pluggable match strategy over the inner map for anything smarter.
//!
//! [`TypeKeyedRegistry`] is the strategy pre-wired for type-identity keys:
//! the key is itself a [`TypeKey`] and lookup falls back from an exact match
//! to a compatibility match via
//! [`find_compatible`](crate::registry::type_match::find_compatible).
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use stowage::KeyedRegistry;
//!
//! let registry: KeyedRegistry<String> = KeyedRegistry::new();
//! registry.register(Arc::new(42u32), "answer".to_string());
//!
//! assert_eq!(registry.resolve::<u32>(&"answer".to_string()).as_deref(), Some(&42));
//! assert!(registry.resolve::<u32>(&"question".to_string()).is_none());
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::key::{TypeKey, TypeQuery};
use crate::registry::entry::ServiceEntry;
use crate::registry::type_match::find_compatible;

/// A registry whose per-type storage is partitioned by a caller-supplied key.
pub struct KeyedRegistry<K> {
    slots: Mutex<HashMap<TypeKey, HashMap<K, ServiceEntry>>>,
}

// Not derived: K itself need not be Default.
impl<K> Default for KeyedRegistry<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash> KeyedRegistry<K> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value` under `T` and `key`. A value already present in
    /// that key partition is replaced; last writer wins.
    pub fn register<T: ?Sized + Send + Sync + 'static>(&self, value: Arc<T>, key: K) {
        let mut slots = self.slots.lock();
        let type_key = TypeKey::of::<T>();
        debug!("Registered keyed value for type '{}'", type_key.name());
        slots
            .entry(type_key)
            .or_default()
            .insert(key, ServiceEntry::new(value));
    }

    /// The value registered under `T` and exactly `key`.
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self, key: &K) -> Option<Arc<T>> {
        let slots = self.slots.lock();
        slots
            .get(&TypeKey::of::<T>())?
            .get(key)?
            .resolve::<T>()
    }

    /// Resolves with a custom match strategy over `T`'s key partition, for
    /// when exact key lookup is insufficient. The strategy receives the
    /// inner map and the query key and picks the entry to return.
    pub fn resolve_with<T, F>(&self, key: &K, matcher: F) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
        F: for<'a> FnOnce(&'a HashMap<K, ServiceEntry>, &K) -> Option<&'a ServiceEntry>,
    {
        let slots = self.slots.lock();
        let entries = slots.get(&TypeKey::of::<T>())?;
        matcher(entries, key)?.resolve::<T>()
    }

    /// Drops every key partition registered for `T`.
    pub fn release<T: ?Sized + 'static>(&self) {
        if self.slots.lock().remove(&TypeKey::of::<T>()).is_some() {
            debug!(
                "Released all keyed values for type '{}'",
                TypeKey::of::<T>().name()
            );
        }
    }

    /// Drops the entry under `T` and `key`; an inner map left empty is
    /// removed with it, so no empty buckets persist.
    pub fn release_key<T: ?Sized + 'static>(&self, key: &K) {
        let mut slots = self.slots.lock();
        let type_key = TypeKey::of::<T>();
        let drop_type = match slots.get_mut(&type_key) {
            None => return,
            Some(entries) => {
                entries.remove(key);
                entries.is_empty()
            }
        };
        if drop_type {
            slots.remove(&type_key);
        }
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}

/// A keyed registry whose keys are type identities matched by compatibility.
///
/// Values are registered under an exact [`TypeKey`]; resolution takes a
/// [`TypeQuery`] and applies the compatibility matcher, so a query type can
/// fall back to an entry registered under one of its declared capabilities.
#[derive(Default)]
pub struct TypeKeyedRegistry {
    inner: KeyedRegistry<TypeKey>,
}

impl TypeKeyedRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value` under `T` and the type-identity `key`.
    pub fn register<T: ?Sized + Send + Sync + 'static>(&self, value: Arc<T>, key: TypeKey) {
        self.inner.register(value, key);
    }

    /// The value whose key is compatible with `query`: an exact key match,
    /// or failing that the first declared capability with an entry. An
    /// ancestor key in the table blocks the fallback (see
    /// [`find_compatible`]).
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self, query: &TypeQuery) -> Option<Arc<T>> {
        self.inner
            .resolve_with::<T, _>(&query.key(), |entries, _| find_compatible(entries, query))
    }

    /// Drops every key partition registered for `T`.
    pub fn release<T: ?Sized + 'static>(&self) {
        self.inner.release::<T>();
    }

    /// Drops the entry under `T` and the exact type-identity `key`.
    pub fn release_key<T: ?Sized + 'static>(&self, key: &TypeKey) {
        self.inner.release_key::<T>(key);
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
