//! Template and embed rendering.
//!
//! Recursively resolves custom tags (`eztemplate`) and embedded resources
//! (`ezembed`) and injects machine-readable payload markers. Processing is
//! post-order per element: an element's content subtree is converted before
//! the element's own render call, so a parent renders over already-converted
//! children.

use std::sync::Arc;

use serde_json::{Map, Value};

use richtext_core::gateway::{self, RenderParams};
use richtext_core::{Document, Node, Reference, extract};

use crate::converter::Converter;
use crate::error::ConvertError;
use crate::link::RESOLVED_ATTR;

/// Child element carrying the injected payload marker.
const PAYLOAD_TAG: &str = "ezpayload";

/// Resolves custom tags and embeds through the render capability.
pub struct RenderConverter {
    renderer: Arc<dyn gateway::TemplateRenderer>,
}

impl RenderConverter {
    /// Create a converter over the render capability.
    #[must_use]
    pub fn new(renderer: Arc<dyn gateway::TemplateRenderer>) -> Self {
        Self { renderer }
    }

    fn rewrite(&self, node: &mut Node) {
        for child in &mut node.children {
            self.rewrite(child);
        }
        match node.local_name() {
            "eztemplate" | "eztemplateinline" => self.render_template(node),
            "ezembed" | "ezembedinline" => self.render_embed(node),
            _ => {}
        }
    }

    /// Render a custom tag or style; its children are replaced by a payload
    /// node carrying the renderer's chosen identifier.
    fn render_template(&self, node: &mut Node) {
        let Some(name) = node.attr("name").filter(|n| !n.is_empty()).map(str::to_owned)
        else {
            tracing::error!(tag = %node.tag, "template element without a name");
            return;
        };
        let kind = node.attr("type").unwrap_or("tag").to_owned();
        let is_inline = node.local_name().ends_with("inline");
        let params = node.child_named("ezconfig").map(extract_config).unwrap_or_default();

        match self
            .renderer
            .render_template(&name, &kind, &params, is_inline)
        {
            Some(payload) => {
                node.text.clear();
                node.children = vec![Node::new(PAYLOAD_TAG).with_text(payload)];
            }
            None => {
                tracing::warn!(name, "renderer produced no output for template");
            }
        }
    }

    /// Render an embed; a payload node carrying the referenced identifier is
    /// appended alongside the existing link/config children.
    fn render_embed(&self, node: &mut Node) {
        let Some(href) = node.attr("xlink:href").filter(|h| !h.is_empty()).map(str::to_owned)
        else {
            tracing::error!(tag = %node.tag, "embed element without a reference");
            return;
        };

        let is_inline = node.local_name().ends_with("inline");
        let default_view = if is_inline { "embed-inline" } else { "embed" };
        let view = node.attr("view").unwrap_or(default_view).to_owned();

        let mut params = node.child_named("ezconfig").map(extract_config).unwrap_or_default();
        if let Some(ezlink) = node.child_named("ezlink") {
            match ezlink.attr(RESOLVED_ATTR) {
                Some(url) => {
                    params.insert("link".to_owned(), Value::String(url.to_owned()));
                }
                None => {
                    tracing::error!(href, "missing resolved embed link");
                }
            }
        }
        if let Some(data) = data_attributes(node) {
            params.insert("dataAttributes".to_owned(), Value::Object(data));
        }

        let payload = match Reference::parse(&href) {
            Some(Reference::Content { id, .. }) => {
                let _ = self
                    .renderer
                    .render_content_embed(id, &view, &params, is_inline);
                id
            }
            Some(Reference::Location { id, .. }) => {
                let _ = self
                    .renderer
                    .render_location_embed(id, &view, &params, is_inline);
                id
            }
            _ => {
                tracing::error!(href, "unsupported embed reference scheme");
                return;
            }
        };

        node.children.retain(|c| c.local_name() != PAYLOAD_TAG);
        node.children
            .push(Node::new(PAYLOAD_TAG).with_text(payload.to_string()));
    }
}

impl Converter for RenderConverter {
    fn convert(&self, doc: &Document) -> Result<Document, ConvertError> {
        let mut out = doc.clone();
        self.rewrite(&mut out.root);
        Ok(out)
    }
}

/// Extract the configuration map from an `ezconfig` element.
///
/// Each `ezvalue` child becomes an entry: leaf text, a nested map when the
/// value holds further `ezvalue` children, or null for an empty element.
fn extract_config(config: &Node) -> RenderParams {
    let mut map = Map::new();
    for value in config.children_named("ezvalue") {
        let Some(key) = value.attr("key") else {
            continue;
        };
        map.insert(key.to_owned(), config_value(value));
    }
    map
}

fn config_value(node: &Node) -> Value {
    if node.children_named("ezvalue").next().is_some() {
        Value::Object(extract_config(node))
    } else {
        let text = extract::extract_text(node);
        if text.is_empty() {
            Value::Null
        } else {
            Value::String(text)
        }
    }
}

/// Fold `ezattribute`/`ezvalue` children into one data-attribute map.
fn data_attributes(node: &Node) -> Option<Map<String, Value>> {
    let mut map = Map::new();
    for attribute in node.children_named("ezattribute") {
        for value in attribute.children_named("ezvalue") {
            if let Some(key) = value.attr("key") {
                map.insert(key.to_owned(), config_value(value));
            }
        }
    }
    (!map.is_empty()).then_some(map)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use richtext_core::loader::load;

    use super::*;

    /// Records every render call and answers with a fixed payload.
    #[derive(Default)]
    struct RecordingRenderer {
        calls: Mutex<Vec<String>>,
        template_payload: Option<String>,
    }

    impl gateway::TemplateRenderer for RecordingRenderer {
        fn render_template(
            &self,
            name: &str,
            kind: &str,
            params: &RenderParams,
            is_inline: bool,
        ) -> Option<String> {
            self.calls.lock().unwrap().push(format!(
                "template {name} {kind} inline={is_inline} params={}",
                Value::Object(params.clone())
            ));
            self.template_payload.clone()
        }

        fn render_content_embed(
            &self,
            content_id: i64,
            view_type: &str,
            params: &RenderParams,
            is_inline: bool,
        ) -> Option<String> {
            self.calls.lock().unwrap().push(format!(
                "content {content_id} {view_type} inline={is_inline} params={}",
                Value::Object(params.clone())
            ));
            None
        }

        fn render_location_embed(
            &self,
            location_id: i64,
            view_type: &str,
            params: &RenderParams,
            is_inline: bool,
        ) -> Option<String> {
            self.calls.lock().unwrap().push(format!(
                "location {location_id} {view_type} inline={is_inline} params={}",
                Value::Object(params.clone())
            ));
            None
        }
    }

    fn convert_with(renderer: RecordingRenderer, input: &str) -> (Document, Vec<String>) {
        let renderer = Arc::new(renderer);
        let converter = RenderConverter::new(Arc::clone(&renderer) as Arc<dyn gateway::TemplateRenderer>);
        let out = converter.convert(&load(input).unwrap()).unwrap();
        let calls = renderer.calls.lock().unwrap().clone();
        (out, calls)
    }

    #[test]
    fn embed_gets_a_payload_child_appended() {
        let (out, calls) = convert_with(
            RecordingRenderer::default(),
            r#"<section><ezembed xlink:href="ezcontent://106" view="embed"/></section>"#,
        );
        let embed = &out.root.children[0];
        assert_eq!(embed.children.len(), 1);
        assert_eq!(embed.children[0].tag, "ezpayload");
        assert_eq!(embed.children[0].text, "106");
        assert_eq!(calls, vec!["content 106 embed inline=false params={}"]);
    }

    #[test]
    fn template_children_are_replaced_by_the_payload() {
        let renderer = RecordingRenderer {
            template_payload: Some("rendered-42".to_owned()),
            ..Default::default()
        };
        let (out, calls) = convert_with(
            renderer,
            concat!(
                r#"<section><eztemplate name="factbox">"#,
                r#"<ezcontent>inner</ezcontent>"#,
                r#"<ezconfig><ezvalue key="width">300</ezvalue></ezconfig>"#,
                "</eztemplate></section>"
            ),
        );
        let template = &out.root.children[0];
        assert_eq!(template.children.len(), 1);
        assert_eq!(template.children[0].text, "rendered-42");
        assert_eq!(
            calls,
            vec![r#"template factbox tag inline=false params={"width":"300"}"#]
        );
    }

    #[test]
    fn nested_templates_render_inner_first() {
        let renderer = RecordingRenderer {
            template_payload: Some("p".to_owned()),
            ..Default::default()
        };
        let (_, calls) = convert_with(
            renderer,
            concat!(
                r#"<section><eztemplate name="outer"><ezcontent>"#,
                r#"<eztemplateinline name="inner"/>"#,
                "</ezcontent></eztemplate></section>"
            ),
        );
        assert_eq!(
            calls,
            vec![
                "template inner tag inline=true params={}",
                "template outer tag inline=false params={}",
            ]
        );
    }

    #[test]
    fn unsupported_scheme_leaves_the_element_untouched() {
        let input = r#"<section><ezembed xlink:href="ezremote://abc" view="embed"/></section>"#;
        let (out, calls) = convert_with(RecordingRenderer::default(), input);
        assert!(calls.is_empty());
        assert_eq!(out.root.children[0].children.len(), 0);
    }

    #[test]
    fn embed_with_unresolved_link_still_gets_a_payload() {
        let (out, _) = convert_with(
            RecordingRenderer::default(),
            concat!(
                r#"<section><ezembed xlink:href="ezcontent://7" view="embed">"#,
                r#"<ezlink xlink:href="ezlocation://12"/>"#,
                "</ezembed></section>"
            ),
        );
        let embed = &out.root.children[0];
        assert_eq!(embed.children.last().unwrap().tag, "ezpayload");
        assert_eq!(embed.children.last().unwrap().text, "7");
    }

    #[test]
    fn data_attributes_are_folded_into_params() {
        let (_, calls) = convert_with(
            RecordingRenderer::default(),
            concat!(
                r#"<section><ezembedinline xlink:href="ezlocation://9">"#,
                r#"<ezattribute><ezvalue key="align">right</ezvalue></ezattribute>"#,
                "</ezembedinline></section>"
            ),
        );
        assert_eq!(
            calls,
            vec![r#"location 9 embed-inline inline=true params={"dataAttributes":{"align":"right"}}"#]
        );
    }

    #[test]
    fn nested_config_maps_are_extracted() {
        let config = load(concat!(
            "<ezconfig>",
            r#"<ezvalue key="size"><ezvalue key="width">10</ezvalue><ezvalue key="height"/></ezvalue>"#,
            "</ezconfig>"
        ))
        .unwrap();
        let params = extract_config(&config.root);
        assert_eq!(
            Value::Object(params).to_string(),
            r#"{"size":{"height":null,"width":"10"}}"#
        );
    }
}
