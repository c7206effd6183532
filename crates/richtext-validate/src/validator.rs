//! Validator trait, namespace dispatch, and the aggregate.

use std::collections::HashMap;
use std::sync::Arc;

use richtext_core::Document;

use crate::error::ValidateError;

/// One source of validation messages.
///
/// Validators are total: they inspect the document and report every problem
/// they can find as a human-readable string, never failing partway. An empty
/// list means the document passed.
pub trait Validator: Send + Sync {
    /// Collect every validation error for the document.
    fn validate(&self, doc: &Document) -> Vec<String>;
}

/// Runs every registered validator and concatenates their error lists.
///
/// Registration order is preserved in the combined list so callers can show
/// schema-level messages before business-rule messages.
#[derive(Default, Clone)]
pub struct ValidatorAggregate {
    validators: Vec<Arc<dyn Validator>>,
}

impl ValidatorAggregate {
    /// Create an empty aggregate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validator.
    #[must_use]
    pub fn with(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Append an already-shared validator.
    #[must_use]
    pub fn with_shared(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validators.push(validator);
        self
    }
}

impl Validator for ValidatorAggregate {
    fn validate(&self, doc: &Document) -> Vec<String> {
        self.validators
            .iter()
            .flat_map(|validator| validator.validate(doc))
            .collect()
    }
}

/// Routes a document to the validator registered for its root namespace.
///
/// Same closed-mapping contract as the converter dispatcher: a namespace may
/// map to a validator, to an explicit no-op, or be absent, which is a
/// configuration error rather than a validation failure.
#[derive(Default, Clone)]
pub struct ValidatorDispatcher {
    map: HashMap<String, Option<Arc<dyn Validator>>>,
}

impl ValidatorDispatcher {
    /// Create an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validator for a namespace.
    #[must_use]
    pub fn with_validator(
        mut self,
        namespace: impl Into<String>,
        validator: impl Validator + 'static,
    ) -> Self {
        self.map.insert(namespace.into(), Some(Arc::new(validator)));
        self
    }

    /// Register an already-shared validator for a namespace.
    #[must_use]
    pub fn with_shared(
        mut self,
        namespace: impl Into<String>,
        validator: Arc<dyn Validator>,
    ) -> Self {
        self.map.insert(namespace.into(), Some(validator));
        self
    }

    /// Register a namespace that needs no validation.
    #[must_use]
    pub fn with_noop(mut self, namespace: impl Into<String>) -> Self {
        self.map.insert(namespace.into(), None);
        self
    }

    /// Validate a document with the validator chosen by its root namespace.
    ///
    /// # Errors
    ///
    /// [`ValidateError::UnsupportedNamespace`] when no mapping exists for the
    /// root namespace.
    pub fn dispatch(&self, doc: &Document) -> Result<Vec<String>, ValidateError> {
        let namespace = doc.root_namespace().unwrap_or_default();
        match self.map.get(namespace) {
            None => Err(ValidateError::UnsupportedNamespace(namespace.to_owned())),
            Some(None) => Ok(Vec::new()),
            Some(Some(validator)) => Ok(validator.validate(doc)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use richtext_core::{Document, Node, ns};

    use super::*;

    struct Fixed(&'static str);

    impl Validator for Fixed {
        fn validate(&self, _doc: &Document) -> Vec<String> {
            vec![self.0.to_owned()]
        }
    }

    fn doc_with_ns(namespace: &str) -> Document {
        Document::new(Node::new("section").with_attr("xmlns", namespace))
    }

    #[test]
    fn aggregate_concatenates_in_registration_order() {
        let aggregate = ValidatorAggregate::new().with(Fixed("first")).with(Fixed("second"));
        let doc = doc_with_ns(ns::DOCBOOK);
        assert_eq!(aggregate.validate(&doc), vec!["first", "second"]);
    }

    #[test]
    fn dispatch_routes_by_root_namespace() {
        let dispatcher = ValidatorDispatcher::new()
            .with_validator(ns::DOCBOOK, Fixed("docbook error"))
            .with_noop(ns::XHTML5_EDIT);
        assert_eq!(
            dispatcher.dispatch(&doc_with_ns(ns::DOCBOOK)).unwrap(),
            vec!["docbook error"]
        );
        assert_eq!(
            dispatcher.dispatch(&doc_with_ns(ns::XHTML5_EDIT)).unwrap(),
            Vec::<String>::new()
        );
    }

    #[test]
    fn unmapped_namespace_is_an_error() {
        let dispatcher = ValidatorDispatcher::new().with_noop(ns::DOCBOOK);
        let err = dispatcher.dispatch(&doc_with_ns("urn:other")).unwrap_err();
        assert!(matches!(
            err,
            ValidateError::UnsupportedNamespace(namespace) if namespace == "urn:other"
        ));
    }
}
