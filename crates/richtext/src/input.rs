//! Accepting external input into the validated internal form.

use richtext_convert::{Converter, ConverterDispatcher, NamespaceMigration};
use richtext_core::extract::{self, Relations};
use richtext_core::{Document, loader, sanitize};
use richtext_validate::ValidatorDispatcher;

use crate::error::Error;

/// Entry point for text arriving from outside the engine.
///
/// Raw text is sanitized before parsing, parsed documents get their legacy
/// namespaces migrated, and the converter registered for the root namespace
/// brings the tree into the internal DocBook dialect. Validation and
/// relation extraction run on the converted form.
pub struct InputHandler {
    converters: ConverterDispatcher,
    validators: ValidatorDispatcher,
}

impl InputHandler {
    /// Create a handler from the configured dispatchers.
    #[must_use]
    pub fn new(converters: ConverterDispatcher, validators: ValidatorDispatcher) -> Self {
        Self {
            converters,
            validators,
        }
    }

    /// Sanitize, parse, and convert raw text into the internal form.
    pub fn from_string(&self, raw: &str) -> Result<Document, Error> {
        let safe = sanitize::sanitize(raw)?;
        let doc = loader::load(&safe)?;
        self.from_document(&doc)
    }

    /// Convert an already-parsed document into the internal form.
    pub fn from_document(&self, doc: &Document) -> Result<Document, Error> {
        let migrated = NamespaceMigration.convert(doc)?;
        Ok(self.converters.dispatch(&migrated)?)
    }

    /// Validate an internal-form document, returning every error message.
    pub fn validate(&self, doc: &Document) -> Result<Vec<String>, Error> {
        Ok(self.validators.dispatch(doc)?)
    }

    /// Relation identifiers referenced by the document.
    #[must_use]
    pub fn relations(&self, doc: &Document) -> Relations {
        extract::relations(doc)
    }
}
