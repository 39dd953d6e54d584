//! Polymorphic registry: type tag to encode/decode handlers.
//!
//! ## Menu
//!
//! - [`HandlerEntry`]: the encode/decode pair of one concrete type.
//! - [`RegistryScope`]: the entries of one (base, driver) pair, keyed by tag.
//! - [`TypeRegistry`]: all scopes, created lazily on registration.
//! - [`TypeRegistryArc`]: a shared, lockable registry handed to drivers.
//! - [`global`]: the process-wide registry, filled by `auto_register`.
//!
//! ## auto_register
//!
//! See [`TypeRegistry::auto_register`] and [`register_polymorphic!`].
//!
//! We use [`inventory`] crate to collect registrations at link time.
//! Not all platforms support it, although major platforms do. Without
//! the `auto_register` feature, [`register_polymorphic!`] expands to nothing
//! and registration must be done by hand.
//!
//! [`register_polymorphic!`]: crate::register_polymorphic
//! [`inventory`]: https://docs.rs/inventory

// -----------------------------------------------------------------------------
// Modules

mod entry;
mod global;
mod scope;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

pub use entry::HandlerEntry;
pub use global::global;
pub use scope::RegistryScope;
pub use type_registry::{TypeRegistry, TypeRegistryArc};
