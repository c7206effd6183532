//! The transform engine: priority-merged rule stylesheets.
//!
//! A converter instance owns a base stylesheet path plus caller-supplied
//! custom stylesheet descriptors. The merged rule set is compiled lazily on
//! first use and cached for the lifetime of the instance; concurrent callers
//! sharing one instance are serialized through the cell's first-build
//! guarantee.

mod stylesheet;

pub use stylesheet::{Assert, CompiledRule, CompiledTemplate, Rule, Stylesheet};

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use richtext_config::StylesheetDescriptor;
use richtext_core::{Document, Node};

use crate::converter::Converter;
use crate::error::ConvertError;

/// Stylesheet-driven document transformer.
pub struct Xslt {
    base_path: PathBuf,
    custom: Vec<StylesheetDescriptor>,
    template: OnceLock<CompiledTemplate>,
}

impl Xslt {
    /// Create a transformer for a base stylesheet with custom imports.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>, custom: Vec<StylesheetDescriptor>) -> Self {
        Self {
            base_path: base_path.into(),
            custom,
            template: OnceLock::new(),
        }
    }

    /// The compiled template, building it on first use.
    fn template(&self) -> Result<&CompiledTemplate, ConvertError> {
        if let Some(template) = self.template.get() {
            return Ok(template);
        }
        let template = self.compile()?;
        Ok(self.template.get_or_init(|| template))
    }

    /// Load the base stylesheet and merge the custom stylesheets into it as
    /// imports, grouped and flattened by ascending priority with input order
    /// preserved inside each group.
    fn compile(&self) -> Result<CompiledTemplate, ConvertError> {
        let base = load_stylesheet(&self.base_path)?;

        let mut ordered: Vec<&StylesheetDescriptor> = self.custom.iter().collect();
        ordered.sort_by_key(|descriptor| descriptor.priority);

        let mut imports = Vec::with_capacity(ordered.len());
        for descriptor in ordered {
            imports.push(load_stylesheet(&descriptor.path)?);
        }

        Ok(CompiledTemplate::merge(imports, base))
    }
}

fn load_stylesheet(path: &Path) -> Result<Stylesheet, ConvertError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|_| ConvertError::StylesheetNotFound(path.to_path_buf()))?;
    Stylesheet::parse(&raw).map_err(|e| {
        ConvertError::transformation(format!("stylesheet {}: {e}", path.display()))
    })
}

impl Converter for Xslt {
    fn convert(&self, doc: &Document) -> Result<Document, ConvertError> {
        let template = self.template()?;
        if template.report_mode {
            Ok(report(template, doc))
        } else {
            transform(template, doc)
        }
    }
}

fn transform(template: &CompiledTemplate, doc: &Document) -> Result<Document, ConvertError> {
    let mut messages = Vec::new();
    let (lead, mut nodes) = rewrite(template, &doc.root, &mut messages);
    if !messages.is_empty() {
        return Err(ConvertError::TransformationFailed { messages });
    }
    if nodes.len() != 1 || !lead.trim().is_empty() {
        return Err(ConvertError::transformation(
            "transformation did not produce a single root element",
        ));
    }
    Ok(Document {
        decl: doc.decl.clone(),
        doctype: doc.doctype.clone(),
        root: nodes.remove(0),
    })
}

/// Rewrite one element, post-order.
///
/// Returns text to splice in at the element's position plus the replacement
/// nodes: a dropped element yields nothing, an unwrapped element yields its
/// (already converted) children with its leading text carried out. The
/// element's own tail is the caller's to place.
fn rewrite(
    template: &CompiledTemplate,
    node: &Node,
    messages: &mut Vec<String>,
) -> (String, Vec<Node>) {
    let rule = template.find(node);

    if let Some(rule) = rule {
        if rule.drop && rule.unwrap {
            messages.push(format!(
                "rule for '{}' both drops and unwraps the element",
                rule.pattern
            ));
            return (String::new(), Vec::new());
        }
        if rule.drop {
            return (String::new(), Vec::new());
        }
    }

    let mut new = Node {
        tag: node.tag.clone(),
        text: node.text.clone(),
        tail: String::new(),
        attrs: node.attrs.clone(),
        children: Vec::new(),
        self_closing: node.self_closing,
    };

    for child in &node.children {
        let (lead, replacements) = rewrite(template, child, messages);
        append_text(&mut new, &lead);
        new.children.extend(replacements);
        append_text(&mut new, &child.tail);
    }

    if let Some(rule) = rule {
        if rule.unwrap {
            return (std::mem::take(&mut new.text), new.children);
        }
        if let Some(rename) = &rule.rename {
            if rename.is_empty() {
                messages.push(format!("rule for '{}' renames to an empty tag", rule.pattern));
            } else {
                new.tag = rename.clone();
            }
        }
        for name in &rule.drop_attrs {
            new.remove_attr(name);
        }
        for (name, value) in &rule.set_attrs {
            new.set_attr(name, value.clone());
        }
    }

    (String::new(), vec![new])
}

fn append_text(parent: &mut Node, text: &str) {
    if text.is_empty() {
        return;
    }
    match parent.children.last_mut() {
        Some(last) => last.tail.push_str(text),
        None => parent.text.push_str(text),
    }
}

/// Run an assert stylesheet, producing a report tree of `failed-assert`
/// nodes with location paths and message text.
fn report(template: &CompiledTemplate, doc: &Document) -> Document {
    let mut out = Node::new("report");
    collect_asserts(template, &doc.root, "", 1, 1, &mut out);
    Document::new(out)
}

fn collect_asserts(
    template: &CompiledTemplate,
    node: &Node,
    parent_path: &str,
    position: usize,
    siblings: usize,
    out: &mut Node,
) {
    let path = if siblings > 1 {
        format!("{parent_path}/{}[{position}]", node.local_name())
    } else {
        format!("{parent_path}/{}", node.local_name())
    };

    for assert in template.failed_asserts(node) {
        out.children.push(
            Node::new("failed-assert")
                .with_attr("location", path.clone())
                .with_text(assert.message.clone()),
        );
    }

    for (index, child) in node.children.iter().enumerate() {
        let name = child.local_name();
        let siblings = node.children.iter().filter(|c| c.local_name() == name).count();
        let position = node.children[..=index]
            .iter()
            .filter(|c| c.local_name() == name)
            .count();
        collect_asserts(template, child, &path, position, siblings, out);
    }
}
