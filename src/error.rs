//! Structured error handling for registry operations.
//!
//! Lookup misses are not errors: every resolution path returns `Option` and
//! treats "not found" as an ordinary absent result. The error type below only
//! covers the two conditions callers may want to fail loudly on.

/// Errors surfaced by the fallible registry entry points.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No value is registered for the requested abstraction type.
    #[error("no value registered for type '{0}'")]
    NotRegistered(&'static str),

    /// A stored value did not downcast to the type its key promises.
    ///
    /// Cannot occur through the typed registration API; seeing this means the
    /// type-keyed storage invariant was violated elsewhere.
    #[error("value registered for '{key}' is not a '{expected}'")]
    TypeMismatch {
        key: &'static str,
        expected: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, RegistryError>;
