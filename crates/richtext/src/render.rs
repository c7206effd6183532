//! Rendering the internal form to an output surface.

use std::sync::Arc;

use richtext_convert::{Aggregate, Converter};
use richtext_core::Document;
use richtext_core::gateway::{
    ContentLookup, PermissionResolver, RenderParams, TemplateRenderer,
};

use crate::error::Error;

/// Entry point for producing rendered output text.
///
/// The aggregate usually chains link resolution, template/embed rendering,
/// and the output transform; this type only runs the chain and serializes
/// the result.
pub struct OutputRenderer {
    pipeline: Aggregate,
}

impl OutputRenderer {
    /// Create a renderer over a converter chain.
    #[must_use]
    pub fn new(pipeline: Aggregate) -> Self {
        Self { pipeline }
    }

    /// Convert and serialize a document.
    pub fn render(&self, doc: &Document) -> Result<String, Error> {
        Ok(self.pipeline.convert(doc)?.serialize())
    }
}

/// Render capability wrapper that enforces read permission on embed targets.
///
/// Embeds whose target the current user may not read are degraded to no
/// rendered output rather than failing the surrounding conversion; the
/// payload marker is still injected so the document structure stays intact.
pub struct PermissionGatedRenderer {
    inner: Arc<dyn TemplateRenderer>,
    lookup: Arc<dyn ContentLookup>,
    permissions: Arc<dyn PermissionResolver>,
}

impl PermissionGatedRenderer {
    /// Wrap a renderer with permission checks.
    #[must_use]
    pub fn new(
        inner: Arc<dyn TemplateRenderer>,
        lookup: Arc<dyn ContentLookup>,
        permissions: Arc<dyn PermissionResolver>,
    ) -> Self {
        Self {
            inner,
            lookup,
            permissions,
        }
    }

    fn readable_content(&self, content_id: i64) -> bool {
        match self.lookup.load_content_info(content_id) {
            Ok(content) => {
                if self.permissions.can_user("read", &content) {
                    true
                } else {
                    tracing::info!(content_id, "embed target not readable by current user");
                    false
                }
            }
            Err(e) => {
                tracing::warn!(content_id, error = %e, "embed target could not be loaded");
                false
            }
        }
    }
}

impl TemplateRenderer for PermissionGatedRenderer {
    fn render_template(
        &self,
        name: &str,
        kind: &str,
        params: &RenderParams,
        is_inline: bool,
    ) -> Option<String> {
        self.inner.render_template(name, kind, params, is_inline)
    }

    fn render_content_embed(
        &self,
        content_id: i64,
        view_type: &str,
        params: &RenderParams,
        is_inline: bool,
    ) -> Option<String> {
        if !self.readable_content(content_id) {
            return None;
        }
        self.inner
            .render_content_embed(content_id, view_type, params, is_inline)
    }

    fn render_location_embed(
        &self,
        location_id: i64,
        view_type: &str,
        params: &RenderParams,
        is_inline: bool,
    ) -> Option<String> {
        let content_id = match self.lookup.load_location(location_id) {
            Ok(location) => location.content_id,
            Err(e) => {
                tracing::warn!(location_id, error = %e, "embed target could not be loaded");
                return None;
            }
        };
        if !self.readable_content(content_id) {
            return None;
        }
        self.inner
            .render_location_embed(location_id, view_type, params, is_inline)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use richtext_convert::ConvertError;
    use richtext_core::gateway::{ContentInfo, Location, LookupError};
    use richtext_core::{Node, loader::load};

    use super::*;

    struct Stamp;

    impl Converter for Stamp {
        fn convert(&self, doc: &Document) -> Result<Document, ConvertError> {
            let mut out = doc.clone();
            out.root.set_attr("rendered", "yes");
            Ok(out)
        }
    }

    #[test]
    fn render_serializes_the_converted_tree() {
        let renderer = OutputRenderer::new(Aggregate::new().with(Stamp));
        let doc = Document::new(Node::new("section"));
        assert_eq!(
            renderer.render(&doc).unwrap(),
            r#"<section rendered="yes"></section>"#
        );
    }

    #[test]
    fn conversion_failures_propagate() {
        struct Failing;
        impl Converter for Failing {
            fn convert(&self, _doc: &Document) -> Result<Document, ConvertError> {
                Err(ConvertError::transformation("boom"))
            }
        }
        let renderer = OutputRenderer::new(Aggregate::new().with(Failing));
        let doc = load("<section/>").unwrap();
        assert!(matches!(
            renderer.render(&doc).unwrap_err(),
            Error::Convert(ConvertError::TransformationFailed { .. })
        ));
    }

    #[derive(Default)]
    struct RecordingRenderer {
        calls: Mutex<Vec<String>>,
    }

    impl TemplateRenderer for RecordingRenderer {
        fn render_template(
            &self,
            name: &str,
            _kind: &str,
            _params: &RenderParams,
            _is_inline: bool,
        ) -> Option<String> {
            self.calls.lock().unwrap().push(format!("template {name}"));
            Some("out".to_owned())
        }

        fn render_content_embed(
            &self,
            content_id: i64,
            _view_type: &str,
            _params: &RenderParams,
            _is_inline: bool,
        ) -> Option<String> {
            self.calls.lock().unwrap().push(format!("content {content_id}"));
            Some("out".to_owned())
        }

        fn render_location_embed(
            &self,
            location_id: i64,
            _view_type: &str,
            _params: &RenderParams,
            _is_inline: bool,
        ) -> Option<String> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("location {location_id}"));
            Some("out".to_owned())
        }
    }

    struct WorldLookup;

    impl ContentLookup for WorldLookup {
        fn load_content_info(&self, id: i64) -> Result<ContentInfo, LookupError> {
            Ok(ContentInfo {
                id,
                main_location_id: Some(id * 10),
            })
        }

        fn load_location(&self, id: i64) -> Result<Location, LookupError> {
            Ok(Location {
                id,
                content_id: id + 100,
            })
        }

        fn load_content_info_by_remote_id(
            &self,
            remote_id: &str,
        ) -> Result<ContentInfo, LookupError> {
            Err(LookupError::NotFound(remote_id.to_owned()))
        }
    }

    struct DenyContent(i64);

    impl PermissionResolver for DenyContent {
        fn can_user(&self, action: &str, content: &ContentInfo) -> bool {
            action != "read" || content.id != self.0
        }
    }

    fn gated(deny: i64) -> (Arc<RecordingRenderer>, PermissionGatedRenderer) {
        let inner = Arc::new(RecordingRenderer::default());
        let gate = PermissionGatedRenderer::new(
            Arc::clone(&inner) as Arc<dyn TemplateRenderer>,
            Arc::new(WorldLookup),
            Arc::new(DenyContent(deny)),
        );
        (inner, gate)
    }

    #[test]
    fn readable_embeds_reach_the_inner_renderer() {
        let (inner, gate) = gated(999);
        assert_eq!(
            gate.render_content_embed(7, "embed", &RenderParams::new(), false),
            Some("out".to_owned())
        );
        assert_eq!(
            gate.render_location_embed(3, "embed", &RenderParams::new(), false),
            Some("out".to_owned())
        );
        assert_eq!(
            inner.calls.lock().unwrap().clone(),
            vec!["content 7", "location 3"]
        );
    }

    #[test]
    fn unreadable_embeds_degrade_to_none() {
        let (inner, gate) = gated(7);
        assert_eq!(
            gate.render_content_embed(7, "embed", &RenderParams::new(), false),
            None
        );
        // Location 3 resolves to content 103.
        let (_, gate_denying_103) = gated(103);
        assert_eq!(
            gate_denying_103.render_location_embed(3, "embed", &RenderParams::new(), false),
            None
        );
        assert!(inner.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn templates_bypass_the_gate() {
        let (inner, gate) = gated(7);
        assert_eq!(
            gate.render_template("factbox", "tag", &RenderParams::new(), false),
            Some("out".to_owned())
        );
        assert_eq!(inner.calls.lock().unwrap().clone(), vec!["template factbox"]);
    }
}
