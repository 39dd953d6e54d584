use thiserror::Error;
use vc_document::{DocumentError, FieldPath};

use crate::TypeTag;

// -----------------------------------------------------------------------------
// Error

/// Failures of encoding and decoding.
///
/// Every variant propagates up the encode/decode call chain, nothing is
/// replaced by a default value on the way.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    #[error("type tag `{tag}` is not registered for base `{base}` in driver `{driver}`")]
    UnregisteredType {
        tag: String,
        base: &'static str,
        driver: &'static str,
    },

    #[error("type mismatch at the erasure boundary: expected `{expected}`, found `{found}`")]
    TypeMismatch { expected: TypeTag, found: TypeTag },

    #[error("type tag `{tag}` is already registered by another type for base `{base}` in driver `{driver}`")]
    DuplicateTag {
        tag: TypeTag,
        base: &'static str,
        driver: &'static str,
    },

    #[error("field `{path}` is missing")]
    MissingField { path: FieldPath },

    #[error("field `{path}` is not an object")]
    NotAnObject { path: FieldPath },

    #[error("invalid value at `{path}`: {source}")]
    InvalidValue {
        path: FieldPath,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl CodecError {
    /// Returns `true` for [`CodecError::UnregisteredType`].
    #[inline]
    pub fn is_unregistered(&self) -> bool {
        matches!(self, Self::UnregisteredType { .. })
    }

    /// Returns `true` for [`CodecError::TypeMismatch`].
    #[inline]
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// Returns `true` for [`CodecError::MissingField`].
    #[inline]
    pub fn is_missing_field(&self) -> bool {
        matches!(self, Self::MissingField { .. })
    }

    /// Returns `true` for [`CodecError::NotAnObject`].
    #[inline]
    pub fn is_not_an_object(&self) -> bool {
        matches!(self, Self::NotAnObject { .. })
    }
}
