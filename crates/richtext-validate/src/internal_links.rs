//! Internal link target validation.

use std::sync::Arc;

use richtext_core::gateway::{ContentLookup, LookupError};
use richtext_core::{Document, Node, Reference};

use crate::validator::Validator;

const LINK_TAGS: [&str; 2] = ["link", "ezlink"];

/// Checks that every internal link target exists.
///
/// Only content, location, and remote references are checked; stored URLs
/// and already-resolved hrefs are not internal targets. Links with an empty
/// identifier are skipped rather than reported, since the editor writes the
/// identifier only after the URL record is stored. Unauthorized targets
/// exist, so they pass; lookup infrastructure failures are logged and the
/// link is left unjudged.
pub struct InternalLinkValidator {
    lookup: Arc<dyn ContentLookup>,
}

impl InternalLinkValidator {
    /// Create a validator over the content lookup capability.
    #[must_use]
    pub fn new(lookup: Arc<dyn ContentLookup>) -> Self {
        Self { lookup }
    }

    fn walk(&self, node: &Node, errors: &mut Vec<String>) {
        if LINK_TAGS.contains(&node.local_name()) {
            if let Some(href) = node.attr("xlink:href") {
                self.check(href, errors);
            }
        }
        for child in &node.children {
            self.walk(child, errors);
        }
    }

    fn check(&self, href: &str, errors: &mut Vec<String>) {
        let (target, result) = match Reference::parse(href) {
            Some(Reference::Content { id, .. }) => {
                ("content", self.lookup.load_content_info(id).map(|_| ()))
            }
            Some(Reference::Location { id, .. }) => {
                ("location", self.lookup.load_location(id).map(|_| ()))
            }
            Some(Reference::Remote { remote_id, .. }) => (
                "content",
                self.lookup
                    .load_content_info_by_remote_id(&remote_id)
                    .map(|_| ()),
            ),
            Some(Reference::Url { .. }) | None => return,
        };
        match result {
            Ok(()) | Err(LookupError::Unauthorized(_)) => {}
            Err(LookupError::NotFound(_)) => {
                errors.push(format!("Invalid link \"{href}\": cannot find target {target}"));
            }
            Err(e) => {
                tracing::warn!(href, error = %e, "link target could not be checked");
            }
        }
    }
}

impl Validator for InternalLinkValidator {
    fn validate(&self, doc: &Document) -> Vec<String> {
        let mut errors = Vec::new();
        self.walk(&doc.root, &mut errors);
        errors
    }
}
