use serde_json::{Map, Value};

use crate::{DocumentError, FieldPath, cursor};

// -----------------------------------------------------------------------------
// Options

/// How [`Document::merge`] resolves a field present in both documents.
///
/// Objects are always merged key by key, recursively. Everything else
/// (scalars and arrays) is a leaf. A `null` leaf never conflicts: a `null`
/// destination takes the incoming value, a `null` source is ignored.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// The incoming document overwrites the existing leaf.
    #[default]
    LastWriterWins,
    /// The existing leaf is kept.
    KeepExisting,
    /// Two different leaves fail the merge with [`DocumentError::MergeConflict`].
    Reject,
}

/// Runtime options of a [`Document`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Indent the stored text.
    pub pretty: bool,
    /// Policy used by [`Document::merge`] when no explicit one is given.
    pub merge: MergePolicy,
}

impl DocumentOptions {
    /// Compact text, last-writer-wins merging.
    #[inline]
    pub const fn new() -> Self {
        Self {
            pretty: false,
            merge: MergePolicy::LastWriterWins,
        }
    }

    #[inline]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    #[inline]
    pub const fn with_merge(mut self, merge: MergePolicy) -> Self {
        self.merge = merge;
        self
    }
}

// -----------------------------------------------------------------------------
// Document

/// An in-memory document tree.
///
/// The root starts as `null` and becomes an object on the first write.
///
/// # Examples
///
/// ```
/// use vc_document::{Document, FieldPath};
///
/// let mut doc = Document::parse(r#"{"a":{"b":1}}"#).unwrap();
/// let path: FieldPath = ["a"].into_iter().collect();
///
/// *doc.get_mut(&path, Some("c")) = 2.into();
/// assert_eq!(doc.to_text(false).unwrap(), r#"{"a":{"b":1,"c":2}}"#);
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Creates an empty document.
    #[inline]
    pub const fn new() -> Self {
        Self { root: Value::Null }
    }

    /// Wraps an existing tree.
    #[inline]
    pub const fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Parses document text.
    ///
    /// Blank text is accepted as an empty document.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        serde_json::from_str(text)
            .map(Self::from_value)
            .map_err(DocumentError::malformed)
    }

    /// Serializes the tree to text.
    pub fn to_text(&self, pretty: bool) -> Result<String, DocumentError> {
        let text = if pretty {
            serde_json::to_string_pretty(&self.root)
        } else {
            serde_json::to_string(&self.root)
        };
        text.map_err(DocumentError::malformed)
    }

    /// Returns the whole tree.
    #[inline]
    pub const fn as_value(&self) -> &Value {
        &self.root
    }

    /// Returns the whole tree mutably.
    #[inline]
    pub fn as_value_mut(&mut self) -> &mut Value {
        &mut self.root
    }

    #[inline]
    pub fn into_value(self) -> Value {
        self.root
    }

    /// Returns `true` if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        match &self.root {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }

    /// See [`cursor::resolve`].
    #[inline]
    pub fn get(&self, path: &FieldPath, tail: Option<&str>) -> Option<&Value> {
        cursor::resolve(&self.root, path, tail)
    }

    /// See [`cursor::resolve_mut`].
    #[inline]
    pub fn get_mut(&mut self, path: &FieldPath, tail: Option<&str>) -> &mut Value {
        cursor::resolve_mut(&mut self.root, path, tail)
    }

    /// Merges `other` into this document according to `policy`.
    ///
    /// On [`MergePolicy::Reject`] failure the document may already contain
    /// the fields merged before the conflict was found.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use vc_document::{Document, MergePolicy};
    ///
    /// let mut a = Document::from_value(json!({ "x": 1, "o": { "p": 1 } }));
    /// let b = Document::from_value(json!({ "x": 2, "o": { "q": 2 } }));
    ///
    /// a.merge(&b, MergePolicy::KeepExisting).unwrap();
    /// assert_eq!(a.as_value(), &json!({ "x": 1, "o": { "p": 1, "q": 2 } }));
    ///
    /// assert!(a.merge(&b, MergePolicy::Reject).is_err());
    /// ```
    pub fn merge(&mut self, other: &Document, policy: MergePolicy) -> Result<(), DocumentError> {
        let mut path = FieldPath::new();
        merge_value(&mut self.root, &other.root, &mut path, policy)
    }
}

fn merge_value(
    dst: &mut Value,
    src: &Value,
    path: &mut FieldPath,
    policy: MergePolicy,
) -> Result<(), DocumentError> {
    if let (Value::Object(dst), Value::Object(src)) = (&mut *dst, src) {
        return merge_object(dst, src, path, policy);
    }

    if src.is_null() {
        return Ok(());
    }

    if dst.is_null() || *dst == *src {
        *dst = src.clone();
        return Ok(());
    }

    match policy {
        MergePolicy::LastWriterWins => {
            *dst = src.clone();
            Ok(())
        }
        MergePolicy::KeepExisting => Ok(()),
        MergePolicy::Reject => Err(DocumentError::MergeConflict { path: path.clone() }),
    }
}

fn merge_object(
    dst: &mut Map<String, Value>,
    src: &Map<String, Value>,
    path: &mut FieldPath,
    policy: MergePolicy,
) -> Result<(), DocumentError> {
    for (key, value) in src {
        match dst.get_mut(key) {
            Some(existing) => {
                path.push(key);
                let result = merge_value(existing, value, path, policy);
                path.pop();
                result?;
            }
            None => {
                dst.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Document, MergePolicy};
    use crate::DocumentError;

    #[test]
    fn parse_blank_and_malformed() {
        assert!(Document::parse("").unwrap().is_empty());
        assert!(Document::parse("  \n").unwrap().is_empty());

        let err = Document::parse("{ \"a\": ").unwrap_err();
        assert!(matches!(err, DocumentError::MalformedDocument { .. }));
    }

    #[test]
    fn text_round_trip() {
        let doc = Document::from_value(json!({ "b": 1, "a": [1, 2, 3], "s": "x" }));
        let text = doc.to_text(false).unwrap();
        assert_eq!(text, r#"{"b":1,"a":[1,2,3],"s":"x"}"#);
        assert_eq!(Document::parse(&text).unwrap(), doc);

        let pretty = doc.to_text(true).unwrap();
        assert_eq!(Document::parse(&pretty).unwrap(), doc);
    }

    #[test]
    fn merge_last_writer_wins() {
        let mut a = Document::from_value(json!({ "x": 1, "n": null, "o": { "p": 1 } }));
        let b = Document::from_value(json!({ "x": 2, "n": 5, "y": [1], "o": { "p": 3 } }));

        a.merge(&b, MergePolicy::LastWriterWins).unwrap();
        assert_eq!(
            a.as_value(),
            &json!({ "x": 2, "n": 5, "o": { "p": 3 }, "y": [1] })
        );
    }

    #[test]
    fn merge_into_empty() {
        let mut a = Document::new();
        let b = Document::from_value(json!({ "x": 1 }));
        a.merge(&b, MergePolicy::Reject).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn merge_reject_reports_path() {
        let mut a = Document::from_value(json!({ "o": { "p": 1, "same": 2 } }));
        let b = Document::from_value(json!({ "o": { "same": 2, "p": 9 } }));

        match a.merge(&b, MergePolicy::Reject) {
            Err(DocumentError::MergeConflict { path }) => assert_eq!(path.to_string(), "/o/p"),
            other => panic!("unexpected merge result: {other:?}"),
        }
    }

    #[test]
    fn null_source_is_ignored() {
        let mut a = Document::from_value(json!({ "x": 1 }));
        let b = Document::from_value(json!({ "x": null }));
        a.merge(&b, MergePolicy::Reject).unwrap();
        assert_eq!(a.as_value(), &json!({ "x": 1 }));
    }
}
