//! Load sanitized text into a [`Document`].

use crate::dom::{self, Document};
use crate::error::LoadError;
use crate::sanitize::doctype;

/// Parse sanitized XML text into a document tree.
///
/// Entities surviving sanitization are substituted during parse and CDATA
/// sections are folded into plain text, so the in-memory form uses plain text
/// uniformly. Nothing is ever fetched from the network: the parser resolves
/// only the internal subset it is handed.
///
/// # Errors
///
/// [`LoadError::InvalidDocument`] with the full list of parser diagnostics
/// (line, column, severity, message) when the input is not well-formed.
pub fn load(safe_text: &str) -> Result<Document, LoadError> {
    let entities = doctype::internal_entities(safe_text).map_err(|e| {
        // Sanitized text always carries a parseable subset; a failure here is
        // a malformed document, not a sanitizer bug.
        LoadError::invalid(crate::error::ParseDiagnostic {
            line: 1,
            column: 1,
            severity: crate::error::Severity::Fatal,
            message: e.to_string(),
        })
    })?;
    dom::parse(safe_text, &entities)
}
