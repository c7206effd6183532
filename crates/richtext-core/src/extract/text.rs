//! Plain-text projections for full-text indexing.

use crate::dom::{Document, Node};

/// Width of the persisted short-text index column.
const SHORT_TEXT_LIMIT: usize = 255;

/// Order-preserving concatenation of all leaf text under `node`.
///
/// The node's own tail is excluded; a tail belongs to the parent's content.
#[must_use]
pub fn extract_text(node: &Node) -> String {
    let mut out = String::new();
    collect(node, &mut out);
    out
}

fn collect(node: &Node, out: &mut String) {
    out.push_str(&node.text);
    for child in &node.children {
        collect(child, out);
        out.push_str(&child.tail);
    }
}

/// Best-effort "first meaningful line" of a document.
///
/// Descends into the first child of the first child — the title or first
/// paragraph in well-formed storage output — and falls back to the whole
/// document's text. The first-child step sees leading whitespace as content,
/// so pretty-printed documents and emphasis-wrapped titles fall back to the
/// full projection; callers depend on this exact (lossy) behavior.
#[must_use]
pub fn extract_short_text(doc: &Document) -> String {
    let root = &doc.root;

    let candidate = if root.text.is_empty() {
        root.children.first().and_then(|first| {
            if first.text.is_empty() {
                first.children.first().map(extract_text)
            } else {
                Some(first.text.clone())
            }
        })
    } else {
        None
    };

    let text = candidate.unwrap_or_else(|| extract_text(root));
    let first_line = text.lines().next().unwrap_or("").trim();
    first_line.chars().take(SHORT_TEXT_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::loader::load;

    #[test]
    fn extracts_all_leaf_text_in_order() {
        let doc = load(concat!(
            r#"<section xmlns="http://docbook.org/ns/docbook">"#,
            "<para>one <emphasis>two</emphasis> three</para>",
            "<para>four</para>",
            "</section>"
        ))
        .unwrap();
        assert_eq!(extract_text(&doc.root), "one two threefour");
    }

    #[test]
    fn short_text_takes_the_title() {
        let doc = load(concat!(
            r#"<section xmlns="http://docbook.org/ns/docbook">"#,
            "<title>Welcome</title>",
            "<para>Body text.</para>",
            "</section>"
        ))
        .unwrap();
        assert_eq!(extract_short_text(&doc), "Welcome");
    }

    #[test]
    fn pretty_printed_document_falls_back_to_full_text() {
        // The leading newline is the root's first "child"; the heuristic
        // falls back to the whole-document projection and keeps its first
        // line, which is empty here. Known-lossy, kept as-is.
        let doc = load(
            "<section xmlns=\"http://docbook.org/ns/docbook\">\n<title>Welcome</title>\n</section>",
        )
        .unwrap();
        assert_eq!(extract_short_text(&doc), "");
    }

    #[test]
    fn emphasis_wrapped_title_takes_the_wrapped_text() {
        let doc = load(concat!(
            r#"<section xmlns="http://docbook.org/ns/docbook">"#,
            "<title><emphasis>Deep</emphasis> end</title>",
            "</section>"
        ))
        .unwrap();
        assert_eq!(extract_short_text(&doc), "Deep");
    }

    #[test]
    fn short_text_is_truncated_to_column_width() {
        let long = "x".repeat(400);
        let doc = load(&format!(
            r#"<section xmlns="http://docbook.org/ns/docbook"><title>{long}</title></section>"#
        ))
        .unwrap();
        assert_eq!(extract_short_text(&doc).len(), 255);
    }
}
