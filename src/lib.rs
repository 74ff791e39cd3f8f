#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Stowage
//!
//! Thread-safe, type-keyed service registry for decoupled component wiring.
//!
//! ## Overview
//!
//! Stowage lets independent parts of a program register already-constructed
//! implementations of an abstraction and resolve them later by type, without
//! consumers knowing where a value came from. It stores and retrieves; it
//! never constructs, so it is a service locator, not a dependency-injection
//! container.
//!
//! Registries are plain values: the application's composition root owns
//! them and hands references to the components that need them. There is no
//! process-wide table, which keeps tests hermetic.
//!
//! ## Key Features
//!
//! - **Type-keyed resolution**: `resolve::<T>()` with trait-object types as
//!   first-class keys
//! - **Multi-value registration** per type with deterministic insertion
//!   order and O(1) "value after X" traversal
//! - **Capability fan-out**: one value registered under its concrete type
//!   and every declared capability at once
//! - **Compatibility matching**: type-identity keys that fall back from an
//!   exact match to an implemented capability
//! - **Linearizable operations**: one coarse lock per registry instance
//!
//! ## Module Organization
//!
//! - [`registry`] - The registration/resolution engine and keyed variants
//! - [`key`] - Type identity tokens and hierarchy queries
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use stowage::ServiceRegistry;
//!
//! struct Config {
//!     verbose: bool,
//! }
//!
//! let registry = ServiceRegistry::new();
//! registry.register(Arc::new(Config { verbose: true }));
//!
//! let config = registry.resolve::<Config>().expect("config was registered");
//! assert!(config.verbose);
//! ```

pub mod error;
pub mod key;
pub mod registry;

pub use error::RegistryError;
pub use key::{TypeKey, TypeQuery};
pub use registry::{
    find_compatible, identity_of, KeyedRegistry, Registration, RegistryStats, Resolver,
    ServiceEntry, ServiceRegistry, TypeKeyedRegistry,
};
