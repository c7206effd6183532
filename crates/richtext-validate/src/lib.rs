//! Two-tier validation for richtext documents.
//!
//! Schema-level validation runs grammar files (RELAX NG and XSD through
//! libxml2) and Schematron-style assert stylesheets; business-rule validation
//! checks configured custom tags and internal link targets. Every validator
//! reports a list of human-readable messages meant for direct display, and a
//! namespace dispatcher routes documents the same way conversion does.

pub mod custom_tags;
pub mod error;
pub mod internal_links;
pub mod libxml2;
pub mod schema;
pub mod validator;

pub use custom_tags::CustomTagsValidator;
pub use error::{SchemaError, ValidateError};
pub use internal_links::InternalLinkValidator;
pub use schema::SchemaValidator;
pub use validator::{Validator, ValidatorAggregate, ValidatorDispatcher};
