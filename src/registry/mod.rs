//! # Registry Infrastructure
//!
//! The registration/resolution engine and its keyed variants.
//!
//! ## Overview
//!
//! Every registry here shares the same storage discipline: a top-level map
//! keyed by [`TypeKey`](crate::key::TypeKey), guarded by one coarse mutex
//! per instance, with no empty buckets left behind after release. They
//! differ only in how the per-type storage is shaped.
//!
//! ## Available Registries
//!
//! - **ServiceRegistry**: single- or multi-valued slot per type, with
//!   successor resolution and capability fan-out
//! - **KeyedRegistry**: per-type partition by an arbitrary key, pluggable
//!   match strategy
//! - **TypeKeyedRegistry**: keys are type identities, matched by
//!   compatibility rather than equality
//! - **Resolver**: keyed partition with a reserved slot for unkeyed use
//!
//! ## Architecture
//!
//! ```text
//! Registry Infrastructure
//! ├── ServiceRegistry       (type → Single | Multiple slot)
//! │     └── OrderedValueSet (insertion order + O(1) successor/removal)
//! ├── KeyedRegistry<K>      (type → K → value)
//! │     └── TypeKeyedRegistry (K = TypeKey, compatibility matching)
//! └── Resolver<K>           (type → Option<K> → value, reserved default)
//! ```

pub mod entry;
pub mod factory;
pub mod keyed;
pub mod resolver;
pub mod type_match;

mod ordered_set;

pub use entry::{identity_of, ServiceEntry};
pub use factory::{Registration, RegistryStats, ServiceRegistry};
pub use keyed::{KeyedRegistry, TypeKeyedRegistry};
pub use resolver::Resolver;
pub use type_match::find_compatible;
