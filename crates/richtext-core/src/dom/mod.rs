//! In-memory tree representation of a richtext document.
//!
//! The model mirrors the serialized form closely: an element carries the text
//! before its first child and every child carries the text that follows it
//! (its tail), so mixed content survives a parse/serialize round trip
//! unchanged. Attributes are kept in document order for the same reason.

mod parser;
mod serializer;

pub use parser::parse;
pub use serializer::serialize_node;

/// Element node in a parsed richtext tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    /// Tag name as written in the source, prefix included.
    pub tag: String,
    /// Text content before the first child.
    pub text: String,
    /// Text after this element's close tag (XML tail).
    pub tail: String,
    /// Attributes in document order.
    pub attrs: Vec<(String, String)>,
    /// Child elements.
    pub children: Vec<Node>,
    /// Whether the source element was self-closing (`<tag/>`).
    pub self_closing: bool,
}

impl Node {
    /// Create a new node with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Add a child element.
    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Attribute value by exact name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        if let Some(slot) = self.attrs.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value.into();
        } else {
            self.attrs.push((name.to_owned(), value.into()));
        }
    }

    /// Remove an attribute, returning its value if present.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self.attrs.iter().position(|(n, _)| n == name)?;
        Some(self.attrs.remove(idx).1)
    }

    /// Tag name with any namespace prefix stripped.
    #[must_use]
    pub fn local_name(&self) -> &str {
        local_name(&self.tag)
    }

    /// Children whose local name matches `name`.
    pub fn children_named<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Node> + use<'a, 'n> {
        self.children.iter().filter(move |c| c.local_name() == name)
    }

    /// First child whose local name matches `name`.
    #[must_use]
    pub fn child_named(&self, name: &str) -> Option<&Node> {
        self.children_named(name).next()
    }
}

/// Tag or attribute name with any namespace prefix stripped.
#[must_use]
pub fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// A parsed richtext document: exactly one root element plus the surrounding
/// prolog kept verbatim for round-tripping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Raw XML declaration (`<?xml ...?>`), if the source had one.
    pub decl: Option<String>,
    /// Raw DOCTYPE content (without the `<!DOCTYPE`/`>` wrapper), if any.
    pub doctype: Option<String>,
    /// The single root element.
    pub root: Node,
}

impl Document {
    /// Create a document around a root element, with no prolog.
    #[must_use]
    pub fn new(root: Node) -> Self {
        Self {
            decl: None,
            doctype: None,
            root,
        }
    }

    /// Namespace URI of the root element.
    ///
    /// Reads the default `xmlns` declaration, falling back to the
    /// `xmlns:xhtml` prefix declaration: the legacy editable dialect declares
    /// no default namespace, only the prefixed one.
    #[must_use]
    pub fn root_namespace(&self) -> Option<&str> {
        self.root
            .attr("xmlns")
            .or_else(|| self.root.attr("xmlns:xhtml"))
    }

    /// Serialize the document back to XML text.
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut out = String::with_capacity(4096);
        if let Some(decl) = &self.decl {
            out.push_str(decl);
            out.push('\n');
        }
        if let Some(doctype) = &self.doctype {
            out.push_str("<!DOCTYPE ");
            out.push_str(doctype);
            out.push('>');
            out.push('\n');
        }
        serialize_node(&self.root, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn attr_order_is_preserved() {
        let mut node = Node::new("para")
            .with_attr("b", "2")
            .with_attr("a", "1");
        node.set_attr("b", "3");
        assert_eq!(node.attrs, vec![("b".into(), "3".into()), ("a".into(), "1".into())]);
    }

    #[test]
    fn local_name_strips_prefix() {
        assert_eq!(local_name("xlink:href"), "href");
        assert_eq!(local_name("para"), "para");
    }

    #[test]
    fn child_lookup_outlives_the_name_string() {
        let node = Node::new("section")
            .with_child(Node::new("title").with_text("t"))
            .with_child(Node::new("para"));
        let found = {
            let name = String::from("title");
            node.child_named(&name)
        };
        assert_eq!(found.map(|n| n.text.as_str()), Some("t"));
    }

    #[test]
    fn root_namespace_falls_back_to_xhtml_prefix() {
        let doc = Document::new(
            Node::new("section").with_attr("xmlns:xhtml", "http://example.net/edit"),
        );
        assert_eq!(doc.root_namespace(), Some("http://example.net/edit"));

        let doc = Document::new(
            Node::new("section")
                .with_attr("xmlns", "http://docbook.org/ns/docbook")
                .with_attr("xmlns:xhtml", "http://example.net/edit"),
        );
        assert_eq!(doc.root_namespace(), Some("http://docbook.org/ns/docbook"));
    }
}
