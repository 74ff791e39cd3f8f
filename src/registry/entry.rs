//! Type-erased storage for registered values.
//!
//! Every registry in this crate stores caller-owned values behind `Arc` and
//! erases the concrete type into `Box<dyn Any>`. The allocation address of
//! the `Arc` is captured at registration time and serves as value identity
//! for removal and successor navigation; an `Arc` and any trait-object
//! coercion of it share the same identity.

use std::any::{self, Any};
use std::fmt;
use std::sync::Arc;

use tracing::error;

use crate::error::RegistryError;

/// Thin-pointer identity of an `Arc` allocation.
///
/// Stable for the lifetime of the allocation and shared by every coerced
/// view of the same `Arc`, so a value registered as `Arc<Svc>` can later be
/// released through an `Arc<dyn Capability>` pointing at it.
pub fn identity_of<T: ?Sized>(value: &Arc<T>) -> usize {
    Arc::as_ptr(value) as *const () as usize
}

/// A registered value: an `Arc<T>` erased to `dyn Any`, plus the identity
/// and type name captured when it was stored.
pub struct ServiceEntry {
    value: Box<dyn Any + Send + Sync>,
    identity: usize,
    type_name: &'static str,
}

impl ServiceEntry {
    /// Erases `value` for storage under the key of `T`.
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            identity: identity_of(&value),
            type_name: any::type_name::<T>(),
            value: Box::new(value),
        }
    }

    /// Identity of the stored `Arc` allocation.
    pub fn identity(&self) -> usize {
        self.identity
    }

    /// Name of the type this entry was stored as.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Recovers the stored `Arc<T>`.
    ///
    /// Fails only if the entry was stored under a key that does not match
    /// its erased type, which the typed registration API rules out.
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, RegistryError> {
        self.value
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or(RegistryError::TypeMismatch {
                key: self.type_name,
                expected: any::type_name::<T>(),
            })
    }

    /// `downcast` with the mismatch logged and flattened into absence, for
    /// the `Option`-returning resolution paths.
    pub(crate) fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        match self.downcast::<T>() {
            Ok(value) => Some(value),
            Err(err) => {
                error!("Type-keyed storage invariant violated: {err}");
                None
            }
        }
    }
}

impl fmt::Debug for ServiceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceEntry")
            .field("type_name", &self.type_name)
            .field("identity", &format_args!("{:#x}", self.identity))
            .finish()
    }
}
