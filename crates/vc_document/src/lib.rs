//! Document tree, field cursor and sessions.
//!
//! This crate knows nothing about user types. It owns the tree value
//! ([`serde_json::Value`]), addresses it through a [`FieldPath`] stack and
//! moves text in and out of a [`DocumentStore`].
//!
//! ## Menu
//!
//! - [`FieldPath`]: the current nested-field address.
//! - [`cursor`]: resolve a path to a read or write location.
//! - [`Document`]: the tree, its text round trip and [merging](Document::merge).
//! - [`DocumentStore`]: storage collaborator, see [`FileStore`] and [`MemoryStore`].
//! - [`Session`]: one open document in one [`Mode`], flushed exactly once on close.

// -----------------------------------------------------------------------------
// Modules

mod document;
mod error;
mod path;
mod session;
mod store;

pub mod cursor;

// -----------------------------------------------------------------------------
// Exports

pub use document::{Document, DocumentOptions, MergePolicy};
pub use error::DocumentError;
pub use path::FieldPath;
pub use session::{Mode, Session};
pub use store::{DocumentStore, FileStore, MemoryStore};

pub use serde_json::Value;
