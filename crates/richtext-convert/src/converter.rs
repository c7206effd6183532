//! Converter trait and the ordered aggregate.

use std::sync::Arc;

use richtext_core::Document;

use crate::error::ConvertError;

/// One focused, idempotent document rewrite.
///
/// Converters never mutate their input: each produces a new tree, so a
/// failing step leaves the caller's document untouched.
pub trait Converter: Send + Sync {
    /// Convert a document, producing a new one.
    fn convert(&self, doc: &Document) -> Result<Document, ConvertError>;
}

/// Applies an ordered list of converters in sequence.
///
/// Each converter's output is the next converter's input; used where
/// independent concerns (link resolution, template rendering, the output
/// transform) must compose deterministically.
#[derive(Default, Clone)]
pub struct Aggregate {
    converters: Vec<Arc<dyn Converter>>,
}

impl Aggregate {
    /// Create an empty aggregate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a converter to the chain.
    #[must_use]
    pub fn with(mut self, converter: impl Converter + 'static) -> Self {
        self.converters.push(Arc::new(converter));
        self
    }

    /// Append an already-shared converter to the chain.
    #[must_use]
    pub fn with_shared(mut self, converter: Arc<dyn Converter>) -> Self {
        self.converters.push(converter);
        self
    }
}

impl Converter for Aggregate {
    fn convert(&self, doc: &Document) -> Result<Document, ConvertError> {
        let mut current = doc.clone();
        for converter in &self.converters {
            current = converter.convert(&current)?;
        }
        Ok(current)
    }
}
