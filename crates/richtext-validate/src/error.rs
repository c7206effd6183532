//! Validation error types.
//!
//! Validators themselves report problems as message lists; these enums cover
//! the configuration-level failures around them: dispatch misses and schemas
//! that cannot be loaded or compiled.

use std::path::PathBuf;

/// Dispatch-level validation failure.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ValidateError {
    /// No validator is registered for the document's root namespace.
    #[error("no validator registered for namespace '{0}'")]
    UnsupportedNamespace(String),
}

/// Failure loading or compiling a schema file.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// Schema file could not be read.
    #[error("cannot read schema file {path}")]
    Io {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Schema file did not compile as its grammar.
    #[error("cannot compile schema {0}")]
    Grammar(PathBuf),

    /// Schema file has an extension no validation backend handles.
    #[error("unsupported schema extension on {0}")]
    UnsupportedExtension(PathBuf),
}
