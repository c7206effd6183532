//! Engine-level error type.

use richtext_convert::ConvertError;
use richtext_core::{LoadError, SanitizeError};
use richtext_validate::ValidateError;

/// Any failure along an input or render pipeline.
///
/// Each variant wraps the originating stage's error unchanged so parser
/// diagnostics and transformation messages reach the caller verbatim.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The sanitizer could not complete a substitution step.
    #[error(transparent)]
    Sanitize(#[from] SanitizeError),

    /// The input is not well-formed XML.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Conversion failed.
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// Validation could not be dispatched.
    #[error(transparent)]
    Validate(#[from] ValidateError),
}
