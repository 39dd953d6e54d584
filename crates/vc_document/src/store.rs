use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::DocumentError;

// -----------------------------------------------------------------------------
// DocumentStore

/// Persistence behind a [`Session`](crate::Session).
///
/// The store only moves text: [`load`](Self::load) is called once when a
/// read session opens, [`store`](Self::store) on every flush of a write
/// session, always with the complete document.
pub trait DocumentStore: Send {
    /// Returns the stored text.
    fn load(&mut self) -> Result<String, DocumentError>;

    /// Replaces the stored text.
    fn store(&mut self, text: &str) -> Result<(), DocumentError>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for Box<S> {
    #[inline]
    fn load(&mut self) -> Result<String, DocumentError> {
        (**self).load()
    }

    #[inline]
    fn store(&mut self, text: &str) -> Result<(), DocumentError> {
        (**self).store(text)
    }
}

// -----------------------------------------------------------------------------
// FileStore

/// A [`DocumentStore`] backed by a file on disk.
///
/// Each store truncates the file and writes the whole document.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[inline]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for FileStore {
    fn load(&mut self) -> Result<String, DocumentError> {
        Ok(fs::read_to_string(&self.path)?)
    }

    fn store(&mut self, text: &str) -> Result<(), DocumentError> {
        fs::write(&self.path, text)?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// MemoryStore

/// A [`DocumentStore`] keeping the text in memory.
///
/// Clones share the same buffer, so a clone handed to a write session can be
/// used to open a read session afterwards.
///
/// # Examples
///
/// ```
/// use vc_document::{DocumentStore, MemoryStore};
///
/// let mut store = MemoryStore::new();
/// let view = store.clone();
///
/// store.store("{}").unwrap();
/// assert_eq!(view.text(), "{}");
/// assert_eq!(view.store_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    text: Arc<Mutex<String>>,
    stores: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Arc::new(Mutex::new(text.into())),
            stores: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns a copy of the current text.
    pub fn text(&self) -> String {
        self.text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of completed [`store`](DocumentStore::store) calls.
    #[inline]
    pub fn store_count(&self) -> usize {
        self.stores.load(Ordering::Acquire)
    }
}

impl DocumentStore for MemoryStore {
    fn load(&mut self) -> Result<String, DocumentError> {
        Ok(self.text())
    }

    fn store(&mut self, text: &str) -> Result<(), DocumentError> {
        let mut guard = self.text.lock().unwrap_or_else(PoisonError::into_inner);
        guard.clear();
        guard.push_str(text);
        self.stores.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{DocumentStore, FileStore, MemoryStore};
    use crate::DocumentError;

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("doc.json"));

        assert!(matches!(store.load(), Err(DocumentError::Io { .. })));

        store.store(r#"{"a":1}"#).unwrap();
        store.store(r#"{"b":2}"#).unwrap();
        assert_eq!(store.load().unwrap(), r#"{"b":2}"#);
    }

    #[test]
    fn memory_store_shares_buffer() {
        let mut store = MemoryStore::with_text("x");
        let view = store.clone();
        assert_eq!(view.text(), "x");

        store.store("y").unwrap();
        assert_eq!(view.text(), "y");
        assert_eq!(view.store_count(), 1);
    }
}
