use core::fmt;

use serde_json::Value;

use crate::{Document, DocumentError, DocumentOptions, DocumentStore, FieldPath, MergePolicy};

// -----------------------------------------------------------------------------
// Mode

/// Direction of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Read,
    Write,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Read => f.write_str("reading"),
            Mode::Write => f.write_str("writing"),
        }
    }
}

// -----------------------------------------------------------------------------
// Session

/// One open document, its [`FieldPath`] stack and its storage.
///
/// - A read session parses the stored text when it is opened, so a malformed
///   document is reported right there.
/// - A write session starts from an empty tree and stores the text when it is
///   flushed or closed. Closing (explicitly or by dropping the session) flushes
///   pending writes exactly once.
///
/// Reads are allowed in both modes and observe earlier writes of the same
/// session. Writes are rejected on a read session.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use vc_document::{MemoryStore, Session};
///
/// let store = MemoryStore::new();
///
/// let mut writer = Session::open_write(store.clone());
/// writer.push("foo");
/// writer.set("x", json!(100)).unwrap();
/// writer.pop();
/// writer.close().unwrap();
///
/// assert_eq!(store.text(), r#"{"foo":{"x":100}}"#);
///
/// let mut reader = Session::open_read(store).unwrap();
/// reader.push("foo");
/// assert_eq!(reader.get("x"), Some(&json!(100)));
/// ```
pub struct Session {
    document: Document,
    path: FieldPath,
    mode: Mode,
    options: DocumentOptions,
    store: Option<Box<dyn DocumentStore>>,
    dirty: bool,
    closed: bool,
}

impl Session {
    /// Opens a read session over `store` with default options.
    #[inline]
    pub fn open_read(store: impl DocumentStore + 'static) -> Result<Self, DocumentError> {
        Self::open_read_with(store, DocumentOptions::new())
    }

    /// Opens a read session over `store`.
    ///
    /// Fails with [`DocumentError::MalformedDocument`] if the stored text
    /// cannot be parsed.
    pub fn open_read_with(
        mut store: impl DocumentStore + 'static,
        options: DocumentOptions,
    ) -> Result<Self, DocumentError> {
        let text = store.load()?;
        let document = Document::parse(&text)?;
        log::debug!("opened document session for reading ({} bytes)", text.len());
        Ok(Self::new_internal(
            document,
            Mode::Read,
            options,
            Some(Box::new(store)),
        ))
    }

    /// Opens a write session over `store` with default options.
    #[inline]
    pub fn open_write(store: impl DocumentStore + 'static) -> Self {
        Self::open_write_with(store, DocumentOptions::new())
    }

    /// Opens a write session over `store`.
    ///
    /// Nothing is stored until the first flush.
    pub fn open_write_with(store: impl DocumentStore + 'static, options: DocumentOptions) -> Self {
        log::debug!("opened document session for writing");
        let mut session =
            Self::new_internal(Document::new(), Mode::Write, options, Some(Box::new(store)));
        // A closed write session always leaves a stored document behind.
        session.dirty = true;
        session
    }

    /// Creates a session without storage; flushing does nothing.
    #[inline]
    pub fn in_memory(document: Document, mode: Mode) -> Self {
        Self::new_internal(document, mode, DocumentOptions::new(), None)
    }

    /// Parses `text` into a read session without storage.
    #[inline]
    pub fn from_text(text: &str) -> Result<Self, DocumentError> {
        Ok(Self::in_memory(Document::parse(text)?, Mode::Read))
    }

    fn new_internal(
        document: Document,
        mode: Mode,
        options: DocumentOptions,
        store: Option<Box<dyn DocumentStore>>,
    ) -> Self {
        Self {
            document,
            path: FieldPath::new(),
            mode,
            options,
            store,
            dirty: false,
            closed: false,
        }
    }

    #[inline]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub const fn options(&self) -> &DocumentOptions {
        &self.options
    }

    /// The underlying document, for reading the raw data.
    #[inline]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// The current field path.
    #[inline]
    pub const fn path(&self) -> &FieldPath {
        &self.path
    }

    #[inline]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Descends into the named child.
    #[inline]
    pub fn push(&mut self, segment: &str) {
        self.path.push(segment);
    }

    /// Ascends to the parent.
    #[inline]
    pub fn pop(&mut self) {
        self.path.pop();
    }

    /// Returns the node at the current path followed by `name`.
    ///
    /// `None` means the field does not exist.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.document.get(&self.path, Some(name))
    }

    /// Returns the node at the current path itself.
    #[inline]
    pub fn current(&self) -> Option<&Value> {
        self.document.get(&self.path, None)
    }

    /// Stores `value` at the current path followed by `name`.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), DocumentError> {
        *self.field_mut(Some(name))? = value;
        Ok(())
    }

    /// Returns a settable reference to the current path followed by `name`,
    /// creating intermediate objects.
    pub fn field_mut(&mut self, name: Option<&str>) -> Result<&mut Value, DocumentError> {
        self.check_writable()?;
        self.dirty = true;
        Ok(self.document.get_mut(&self.path, name))
    }

    /// Removes the field `name` below the current path, returning its value.
    ///
    /// Nothing is created on the way; a missing parent gives `Ok(None)`.
    pub fn remove(&mut self, name: &str) -> Result<Option<Value>, DocumentError> {
        self.check_writable()?;
        if !self.current().is_some_and(Value::is_object) {
            return Ok(None);
        }
        let Value::Object(map) = self.document.get_mut(&self.path, None) else {
            return Ok(None);
        };
        let removed = map.shift_remove(name);
        if removed.is_some() {
            self.dirty = true;
        }
        Ok(removed)
    }

    /// Merges another session's document into this one using the configured
    /// [`MergePolicy`].
    #[inline]
    pub fn merge(&mut self, other: &Session) -> Result<(), DocumentError> {
        self.merge_with(other, self.options.merge)
    }

    /// Merges another session's document into this one.
    pub fn merge_with(&mut self, other: &Session, policy: MergePolicy) -> Result<(), DocumentError> {
        self.check_writable()?;
        self.dirty = true;
        self.document.merge(&other.document, policy)
    }

    /// Returns the document text.
    #[inline]
    pub fn dump(&self) -> Result<String, DocumentError> {
        self.document.to_text(self.options.pretty)
    }

    /// Writes pending changes to the store.
    ///
    /// Does nothing for read sessions, sessions without storage, or when
    /// nothing changed since the last flush.
    pub fn flush(&mut self) -> Result<(), DocumentError> {
        if self.closed {
            return Err(DocumentError::Closed);
        }
        self.flush_internal()
    }

    fn flush_internal(&mut self) -> Result<(), DocumentError> {
        if self.mode != Mode::Write || !self.dirty {
            return Ok(());
        }
        let Some(store) = self.store.as_mut() else {
            return Ok(());
        };

        let text = self.document.to_text(self.options.pretty)?;
        store.store(&text)?;
        self.dirty = false;
        log::trace!("flushed document ({} bytes)", text.len());
        Ok(())
    }

    /// Flushes pending changes and releases the store.
    ///
    /// The session is closed even if the flush fails. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<(), DocumentError> {
        if self.closed {
            return Ok(());
        }
        let result = self.flush_internal();
        self.closed = true;
        self.store = None;
        log::debug!("closed {} document session", self.mode);
        result
    }

    fn check_writable(&self) -> Result<(), DocumentError> {
        if self.closed {
            return Err(DocumentError::Closed);
        }
        if self.mode != Mode::Write {
            return Err(DocumentError::WrongMode {
                expected: Mode::Write,
                actual: self.mode,
            });
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::error!("failed to flush document while dropping session: {e}");
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.mode)
            .field("path", &self.path)
            .field("dirty", &self.dirty)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests
