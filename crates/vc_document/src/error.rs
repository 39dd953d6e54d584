use thiserror::Error;

use crate::{FieldPath, Mode};

// -----------------------------------------------------------------------------
// Error

/// Failures of the document layer: parsing, storage and session state.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
    #[error("document text is not valid JSON: {source}")]
    MalformedDocument {
        #[source]
        source: serde_json::Error,
    },

    #[error("document storage failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("conflicting values at `{path}` while merging documents")]
    MergeConflict { path: FieldPath },

    #[error("session was opened for {actual}, but the operation requires {expected}")]
    WrongMode { expected: Mode, actual: Mode },

    #[error("session has already been closed")]
    Closed,
}

impl DocumentError {
    #[inline]
    pub(crate) fn malformed(source: serde_json::Error) -> Self {
        Self::MalformedDocument { source }
    }
}
