//! # Resolver
//!
//! A keyed registry where "no key supplied" is itself a key.
//!
//! ## Overview
//!
//! [`Resolver`] partitions each abstraction type by an optional key. Unkeyed
//! registration stores under a reserved default slot; unkeyed resolution
//! prefers that slot and otherwise falls back to an arbitrary keyed entry,
//! so a caller that does not care which variant it gets still gets one.
//! Unkeyed release drops only the default slot; `release_all` drops the
//! whole type.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use stowage::Resolver;
//!
//! let resolver: Resolver<&str> = Resolver::new();
//! resolver.register(Arc::new("default-theme"));
//! resolver.register_keyed(Arc::new("dark-theme"), "dark");
//!
//! assert_eq!(resolver.resolve::<&str>().as_deref(), Some(&"default-theme"));
//! assert_eq!(resolver.resolve_keyed::<&str>(&"dark").as_deref(), Some(&"dark-theme"));
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::key::TypeKey;
use crate::registry::entry::ServiceEntry;

/// Per-type storage: the reserved default slot plus the keyed entries.
struct KeyPartition<K> {
    default: Option<ServiceEntry>,
    keyed: HashMap<K, ServiceEntry>,
}

impl<K> KeyPartition<K> {
    fn new() -> Self {
        Self {
            default: None,
            keyed: HashMap::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.keyed.is_empty()
    }
}

/// A keyed registry with a reserved slot for unkeyed registrations.
pub struct Resolver<K> {
    slots: Mutex<HashMap<TypeKey, KeyPartition<K>>>,
}

impl<K> Default for Resolver<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash> Resolver<K> {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value` under `T`'s default slot, replacing any previous
    /// unkeyed registration.
    pub fn register<T: ?Sized + Send + Sync + 'static>(&self, value: Arc<T>) {
        let mut slots = self.slots.lock();
        let type_key = TypeKey::of::<T>();
        debug!("Registered default value for type '{}'", type_key.name());
        slots
            .entry(type_key)
            .or_insert_with(KeyPartition::new)
            .default = Some(ServiceEntry::new(value));
    }

    /// Registers `value` under `T` and `key`; last writer wins per key.
    pub fn register_keyed<T: ?Sized + Send + Sync + 'static>(&self, value: Arc<T>, key: K) {
        let mut slots = self.slots.lock();
        let type_key = TypeKey::of::<T>();
        debug!("Registered keyed value for type '{}'", type_key.name());
        slots
            .entry(type_key)
            .or_insert_with(KeyPartition::new)
            .keyed
            .insert(key, ServiceEntry::new(value));
    }

    /// The default value for `T` if one was registered unkeyed, otherwise an
    /// arbitrary keyed value. A partition found empty is dropped on the way
    /// out.
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let mut slots = self.slots.lock();
        let type_key = TypeKey::of::<T>();
        if slots.get(&type_key).is_some_and(KeyPartition::is_empty) {
            slots.remove(&type_key);
            return None;
        }
        let partition = slots.get(&type_key)?;
        match &partition.default {
            Some(entry) => entry.resolve::<T>(),
            None => partition.keyed.values().next()?.resolve::<T>(),
        }
    }

    /// The value registered under `T` and exactly `key`.
    pub fn resolve_keyed<T: ?Sized + Send + Sync + 'static>(&self, key: &K) -> Option<Arc<T>> {
        let slots = self.slots.lock();
        slots
            .get(&TypeKey::of::<T>())?
            .keyed
            .get(key)?
            .resolve::<T>()
    }

    /// Drops the default slot for `T` only; keyed entries stay. The
    /// partition is removed once nothing is left in it.
    pub fn release<T: ?Sized + 'static>(&self) {
        let mut slots = self.slots.lock();
        let type_key = TypeKey::of::<T>();
        let drop_type = match slots.get_mut(&type_key) {
            None => return,
            Some(partition) => {
                partition.default = None;
                partition.is_empty()
            }
        };
        if drop_type {
            slots.remove(&type_key);
        }
    }

    /// Drops the entry under `T` and `key`, collapsing an emptied partition.
    pub fn release_keyed<T: ?Sized + 'static>(&self, key: &K) {
        let mut slots = self.slots.lock();
        let type_key = TypeKey::of::<T>();
        let drop_type = match slots.get_mut(&type_key) {
            None => return,
            Some(partition) => {
                partition.keyed.remove(key);
                partition.is_empty()
            }
        };
        if drop_type {
            slots.remove(&type_key);
        }
    }

    /// Drops everything registered for `T`, default and keyed alike.
    pub fn release_all<T: ?Sized + 'static>(&self) {
        if self.slots.lock().remove(&TypeKey::of::<T>()).is_some() {
            debug!("Released all values for type '{}'", TypeKey::of::<T>().name());
        }
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}
