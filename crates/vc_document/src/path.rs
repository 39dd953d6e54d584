use core::fmt;
use core::slice::Iter;

// -----------------------------------------------------------------------------
// FieldPath

/// The current nested-field address within a document tree.
///
/// A `FieldPath` is a stack of field names. Descending into a named child
/// pushes a segment, ascending pops it. Every push performed during an
/// operation must be matched by exactly one pop before that operation returns,
/// the codec layer guarantees this through scoped helpers.
///
/// The [`Display`](fmt::Display) output uses JSON pointer syntax, which makes
/// paths in error messages easy to locate in the stored text.
///
/// # Examples
///
/// ```
/// use vc_document::FieldPath;
///
/// let mut path = FieldPath::new();
/// path.push("shapes");
/// path.push("a/b");
/// assert_eq!(path.to_string(), "/shapes/a~1b");
///
/// path.pop();
/// assert_eq!(path.len(), 1);
/// ```
#[derive(Default, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Creates an empty path, addressing the document root.
    #[inline]
    pub const fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Descends into the named child.
    #[inline]
    pub fn push(&mut self, segment: &str) {
        self.segments.push(segment.to_owned());
    }

    /// Ascends to the parent, returning the removed segment.
    ///
    /// Popping the root path returns `None` and leaves the path unchanged.
    #[inline]
    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    /// Number of segments, `0` for the root.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if the path addresses the document root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Removes every segment.
    #[inline]
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Returns the segments from the root downwards.
    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Get an iterator over the segments in the order they were pushed.
    #[inline]
    pub fn iter(&self) -> Iter<'_, String> {
        self.segments.iter()
    }

    /// Returns a copy of this path extended by `segment`.
    pub fn join(&self, segment: &str) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }
}

impl<'a> IntoIterator for &'a FieldPath {
    type Item = &'a String;
    type IntoIter = Iter<'a, String>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S: AsRef<str>> FromIterator<S> for FieldPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(|s| s.as_ref().to_owned()).collect(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }

        for segment in &self.segments {
            f.write_str("/")?;
            for c in segment.chars() {
                match c {
                    '~' => f.write_str("~0")?,
                    '/' => f.write_str("~1")?,
                    c => fmt::Write::write_char(f, c)?,
                }
            }
        }

        Ok(())
    }
}

impl fmt::Debug for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldPath(`{self}`)")
    }
}

// -----------------------------------------------------------------------------
// Tests
