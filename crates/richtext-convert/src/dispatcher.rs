//! Namespace-keyed converter dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use richtext_core::Document;

use crate::converter::Converter;
use crate::error::ConvertError;

/// Routes a document to the converter registered for its root namespace.
///
/// The registry is a closed mapping resolved at configuration time: a
/// namespace may map to a converter, map to an explicit no-op (`None`), or be
/// absent, which is a dispatch failure. The root namespace is read from the
/// default `xmlns` declaration with an `xmlns:xhtml` fallback for the legacy
/// dialect that declares no default namespace.
#[derive(Default, Clone)]
pub struct ConverterDispatcher {
    map: HashMap<String, Option<Arc<dyn Converter>>>,
}

impl ConverterDispatcher {
    /// Create an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter for a namespace.
    #[must_use]
    pub fn with_converter(
        mut self,
        namespace: impl Into<String>,
        converter: impl Converter + 'static,
    ) -> Self {
        self.map.insert(namespace.into(), Some(Arc::new(converter)));
        self
    }

    /// Register an already-shared converter for a namespace.
    #[must_use]
    pub fn with_shared(
        mut self,
        namespace: impl Into<String>,
        converter: Arc<dyn Converter>,
    ) -> Self {
        self.map.insert(namespace.into(), Some(converter));
        self
    }

    /// Register a namespace that needs no conversion.
    #[must_use]
    pub fn with_noop(mut self, namespace: impl Into<String>) -> Self {
        self.map.insert(namespace.into(), None);
        self
    }

    /// Convert a document with the converter chosen by its root namespace.
    ///
    /// # Errors
    ///
    /// [`ConvertError::UnsupportedNamespace`] when no mapping exists for the
    /// root namespace.
    pub fn dispatch(&self, doc: &Document) -> Result<Document, ConvertError> {
        let namespace = doc.root_namespace().unwrap_or_default();
        match self.map.get(namespace) {
            None => Err(ConvertError::UnsupportedNamespace(namespace.to_owned())),
            Some(None) => Ok(doc.clone()),
            Some(Some(converter)) => converter.convert(doc),
        }
    }
}
