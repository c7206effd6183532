//! Error types for the conversion pipeline.

use std::path::PathBuf;

use richtext_core::LoadError;
use richtext_core::gateway::LookupError;

/// Error during document conversion.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// No converter is registered for the document's root namespace.
    #[error("unsupported namespace '{0}'")]
    UnsupportedNamespace(String),

    /// The base stylesheet file does not exist; a configuration error.
    #[error("stylesheet not found: {}", .0.display())]
    StylesheetNotFound(PathBuf),

    /// The transformation raised diagnostics or produced no output.
    #[error("transformation failed: {}", .messages.join("; "))]
    TransformationFailed {
        /// All collected diagnostic messages.
        messages: Vec<String>,
    },

    /// A reference lookup failed in a way that cannot be degraded.
    #[error("reference lookup failed")]
    Lookup(#[from] LookupError),

    /// Re-parsing a rewritten document failed.
    #[error("rewritten document is invalid")]
    Reparse(#[from] LoadError),
}

impl ConvertError {
    /// A `TransformationFailed` from a single message.
    #[must_use]
    pub fn transformation(message: impl Into<String>) -> Self {
        Self::TransformationFailed {
            messages: vec![message.into()],
        }
    }
}
