//! # Type Identity Keys
//!
//! Runtime type identities used as registry keys.
//!
//! ## Overview
//!
//! [`TypeKey`] is the stable token every registry in this crate keys its
//! top-level table by. It wraps [`std::any::TypeId`] together with the static
//! type name so log output and errors stay readable. Trait-object types are
//! first-class: `TypeKey::of::<dyn MyTrait>()` is a valid key, which is what
//! makes capability fan-out registration work.
//!
//! [`TypeQuery`] describes a query type for compatibility-based lookup. Rust
//! has no runtime reflection, so the ancestor chain and implemented
//! capabilities of a type cannot be discovered at runtime; callers declare
//! them explicitly when building the query.
//!
//! ## Usage
//!
//! ```rust
//! use stowage::key::{TypeKey, TypeQuery};
//!
//! trait Codec: Send + Sync {}
//! struct JsonCodec;
//! impl Codec for JsonCodec {}
//!
//! let key = TypeKey::of::<JsonCodec>();
//! assert_ne!(key, TypeKey::of::<dyn Codec>());
//!
//! let query = TypeQuery::of::<JsonCodec>().capability::<dyn Codec>();
//! assert_eq!(query.key(), key);
//! assert_eq!(query.capabilities(), [TypeKey::of::<dyn Codec>()]);
//! ```

use std::any::{self, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Stable identity token for an abstraction type.
///
/// Equality and hashing consider the [`TypeId`] only; the name rides along
/// for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// The key for `T`, which may be a trait-object type.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: any::type_name::<T>(),
        }
    }

    /// The static name of the keyed type, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A query type plus its declared hierarchy, for compatibility matching.
///
/// `ancestors` is the superclass chain nearest-first; a query with declared
/// ancestors is treated as class-like by the matcher. `capabilities` is the
/// implemented-capability list in declaration order, which is the order the
/// matcher consults them in.
#[derive(Debug, Clone)]
pub struct TypeQuery {
    key: TypeKey,
    ancestors: Vec<TypeKey>,
    capabilities: Vec<TypeKey>,
}

impl TypeQuery {
    /// Starts a query for `T` with no declared hierarchy.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            ancestors: Vec::new(),
            capabilities: Vec::new(),
        }
    }

    /// Declares the next ancestor in the query type's chain (nearest first).
    pub fn ancestor<A: ?Sized + 'static>(mut self) -> Self {
        self.ancestors.push(TypeKey::of::<A>());
        self
    }

    /// Declares the next capability the query type implements.
    pub fn capability<C: ?Sized + 'static>(mut self) -> Self {
        self.capabilities.push(TypeKey::of::<C>());
        self
    }

    /// The query type's own key.
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Declared ancestor chain, nearest first.
    pub fn ancestors(&self) -> &[TypeKey] {
        &self.ancestors
    }

    /// Declared capabilities, in declaration order.
    pub fn capabilities(&self) -> &[TypeKey] {
        &self.capabilities
    }
}
