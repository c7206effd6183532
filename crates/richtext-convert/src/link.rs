//! Link reference resolution.

use std::sync::Arc;

use richtext_core::gateway::{ContentLookup, LookupError, UrlGenerator};
use richtext_core::{Document, Node, Reference};

use crate::converter::Converter;
use crate::error::ConvertError;

/// Attribute that receives the resolved URL on embed links, leaving the
/// original reference in place for downstream parameter building.
pub const RESOLVED_ATTR: &str = "href_resolved";

/// Resolves `ezcontent`/`ezlocation` hrefs to absolute URLs.
///
/// Plain `link` elements get `xlink:href` rewritten in place; `ezlink`
/// elements (an embed's own hyperlink) are processed unconditionally and
/// receive the resolved value in a side attribute. A target that cannot be
/// resolved degrades to `#` so one broken link never aborts the document;
/// only lookup infrastructure failures propagate.
pub struct LinkResolver {
    lookup: Arc<dyn ContentLookup>,
    urls: Arc<dyn UrlGenerator>,
}

impl LinkResolver {
    /// Create a resolver over the lookup and URL-generation capabilities.
    #[must_use]
    pub fn new(lookup: Arc<dyn ContentLookup>, urls: Arc<dyn UrlGenerator>) -> Self {
        Self { lookup, urls }
    }

    fn resolve_node(&self, node: &mut Node) -> Result<(), ConvertError> {
        let local = node.local_name().to_owned();
        if local == "link" || local == "ezlink" {
            if let Some(href) = node.attr("xlink:href").map(str::to_owned) {
                match Reference::parse(&href) {
                    Some(reference @ (Reference::Content { .. } | Reference::Location { .. })) => {
                        let url = self.resolve(&reference, &href)?;
                        if local == "ezlink" {
                            node.set_attr(RESOLVED_ATTR, url);
                        } else {
                            node.set_attr("xlink:href", url);
                        }
                    }
                    _ if local == "ezlink" => {
                        // Embed links are processed unconditionally; a value
                        // with no internal scheme is already resolved.
                        node.set_attr(RESOLVED_ATTR, href);
                    }
                    _ => {}
                }
            }
        }

        for child in &mut node.children {
            self.resolve_node(child)?;
        }
        Ok(())
    }

    /// Resolve one reference to an absolute URL, degrading to `#` on
    /// recoverable lookup failures.
    fn resolve(&self, reference: &Reference, href: &str) -> Result<String, ConvertError> {
        let resolved = match reference {
            Reference::Location { id, .. } => self
                .lookup
                .load_location(*id)
                .map(|location| self.urls.generate(&location)),
            Reference::Content { id, .. } => self.lookup.load_content_info(*id).and_then(|info| {
                let location_id = info.main_location_id.ok_or_else(|| {
                    LookupError::NotFound(format!("content {id} has no main location"))
                })?;
                Ok(self.urls.generate(&self.lookup.load_location(location_id)?))
            }),
            Reference::Url { .. } | Reference::Remote { .. } => return Ok(href.to_owned()),
        };

        match resolved {
            Ok(url) => Ok(match reference.fragment() {
                Some(fragment) => format!("{url}#{fragment}"),
                None => url,
            }),
            Err(e @ LookupError::NotFound(_)) => {
                tracing::warn!(href, error = %e, "cannot resolve link target");
                Ok("#".to_owned())
            }
            Err(e @ LookupError::Unauthorized(_)) => {
                tracing::info!(href, error = %e, "link target not authorized");
                Ok("#".to_owned())
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Converter for LinkResolver {
    fn convert(&self, doc: &Document) -> Result<Document, ConvertError> {
        let mut out = doc.clone();
        self.resolve_node(&mut out.root)?;
        Ok(out)
    }
}
