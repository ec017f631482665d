//! Error types for annotation operations.
//!
//! Errors never escape the session's public entry points; they are logged
//! and turned into skipped outcomes there.

/// A DOM operation failed on the host page.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("dom operation `{op}` failed: {message}")]
pub struct DomError {
    pub op: &'static str,
    pub message: String,
}

impl DomError {
    pub fn new(op: &'static str, message: impl Into<String>) -> Self {
        Self {
            op,
            message: message.into(),
        }
    }
}

/// Failure while annotating a single issue.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotateError {
    #[error(transparent)]
    Dom(#[from] DomError),

    /// The node was removed from the document before it could be wrapped.
    #[error("node is detached from the document")]
    Detached,

    /// The document has no body to search or attach to.
    #[error("document has no body")]
    NoBody,
}
