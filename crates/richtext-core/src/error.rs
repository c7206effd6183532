//! Error types for sanitizing and loading richtext documents.

use std::fmt;

/// Severity of a parser diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Recoverable oddity the parser tolerated.
    Warning,
    /// Violation that made the document unusable.
    Error,
    /// Parser could not continue at all.
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
            Self::Fatal => f.write_str("fatal"),
        }
    }
}

/// One diagnostic reported while parsing a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// 1-based line of the offending construct.
    pub line: usize,
    /// 1-based column of the offending construct.
    pub column: usize,
    /// Diagnostic severity.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.line, self.column, self.severity, self.message
        )
    }
}

/// Error stripping unsafe constructs from raw input.
///
/// Sanitization failures are always fatal: they mean the sanitizer itself
/// could not complete a substitution, never that an unsafe construct was
/// allowed through.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SanitizeError {
    /// A text substitution step could not complete.
    #[error("sanitization substitution failed: {0}")]
    SubstitutionFailed(String),

    /// The DOCTYPE internal subset could not be parsed.
    #[error("malformed DOCTYPE internal subset: {0}")]
    MalformedDoctype(String),
}

/// Error loading sanitized text into a document tree.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LoadError {
    /// The input was not well-formed XML; every collected parser diagnostic
    /// is attached so callers can surface them verbatim.
    #[error("invalid document: {}", format_diagnostics(.diagnostics))]
    InvalidDocument {
        /// All parser diagnostics, in source order.
        diagnostics: Vec<ParseDiagnostic>,
    },
}

impl LoadError {
    /// Build an `InvalidDocument` from a single diagnostic.
    #[must_use]
    pub fn invalid(diagnostic: ParseDiagnostic) -> Self {
        Self::InvalidDocument {
            diagnostics: vec![diagnostic],
        }
    }
}

fn format_diagnostics(diagnostics: &[ParseDiagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
