//! Core primitives for the richtext engine.
//!
//! A richtext value is stored as a constrained, namespaced XML dialect
//! (DocBook vocabulary). This crate owns the pieces everything else builds
//! on: the in-memory document tree with its quick-xml parser and serializer,
//! the pre-parse sanitizer, the `scheme://id#fragment` reference model, the
//! capability traits the engine calls out through, and the read-only tree
//! walkers used for search indexing and relation tracking.

pub mod dom;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod loader;
pub mod ns;
pub mod reference;
pub mod sanitize;

pub use dom::{Document, Node};
pub use error::{LoadError, ParseDiagnostic, SanitizeError, Severity};
pub use gateway::{
    ContentInfo, ContentLookup, Location, LookupError, PermissionResolver, TemplateRenderer,
    UrlGenerator,
};
pub use loader::load;
pub use reference::Reference;
pub use sanitize::sanitize;
