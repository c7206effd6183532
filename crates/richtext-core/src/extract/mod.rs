//! Read-only tree walkers: relation lists and plain-text projections.

mod relations;
mod text;

pub use relations::{RelationIds, Relations, relations};
pub use text::{extract_short_text, extract_text};
