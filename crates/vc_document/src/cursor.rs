//! Translate a [`FieldPath`] into a location inside a [`Value`] tree.
//!
//! - [`resolve`]: read location, `None` is the "missing" sentinel.
//! - [`resolve_mut`]: write location, intermediate objects are built lazily.
//!
//! Both walk the same segments in the same way, so a value written through
//! [`resolve_mut`] is observed by a following [`resolve`] of the same path.

use serde_json::{Map, Value};

use crate::FieldPath;

/// Returns the node at `path` followed by `tail`, if it exists.
///
/// Walking through anything but an object (an array, a scalar, `null`)
/// yields `None`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use vc_document::{FieldPath, cursor};
///
/// let root = json!({ "a": { "b": 1 } });
/// let path: FieldPath = ["a"].into_iter().collect();
///
/// assert_eq!(cursor::resolve(&root, &path, Some("b")), Some(&json!(1)));
/// assert_eq!(cursor::resolve(&root, &path, Some("c")), None);
/// ```
pub fn resolve<'a>(root: &'a Value, path: &FieldPath, tail: Option<&str>) -> Option<&'a Value> {
    let mut node = root;
    for segment in path.iter().map(String::as_str).chain(tail) {
        node = node.as_object()?.get(segment)?;
    }
    Some(node)
}

/// Returns a settable reference to the node at `path` followed by `tail`.
///
/// Missing nodes are created as empty objects, the final node is created as
/// `null` if it did not exist. An intermediate node that is not an object is
/// replaced by an empty object.
///
/// # Examples
///
/// ```
/// use serde_json::{json, Value};
/// use vc_document::{FieldPath, cursor};
///
/// let mut root = Value::Null;
/// let path: FieldPath = ["a", "b"].into_iter().collect();
///
/// *cursor::resolve_mut(&mut root, &path, Some("c")) = json!(3);
/// assert_eq!(root, json!({ "a": { "b": { "c": 3 } } }));
/// ```
pub fn resolve_mut<'a>(root: &'a mut Value, path: &FieldPath, tail: Option<&str>) -> &'a mut Value {
    let mut node = root;
    for segment in path.iter().map(String::as_str).chain(tail) {
        node = ensure_object(node)
            .entry(segment.to_owned())
            .or_insert(Value::Null);
    }
    node
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced by an object"),
    }
}

// -----------------------------------------------------------------------------
// Tests
