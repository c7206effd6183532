//! Serialize the document tree back to XML text.

use std::fmt::Write;

use super::Node;

/// Serialize a single node and its subtree, appending to `out`.
pub fn serialize_node(node: &Node, out: &mut String) {
    out.push('<');
    out.push_str(&node.tag);

    for (name, value) in &node.attrs {
        let _ = write!(out, r#" {}="{}""#, name, escape_attr(value));
    }

    if node.self_closing && node.children.is_empty() && node.text.is_empty() {
        out.push_str("/>");
    } else {
        out.push('>');
        out.push_str(&escape_text(&node.text));
        for child in &node.children {
            serialize_node(child, out);
        }
        let _ = write!(out, "</{}>", node.tag);
    }

    out.push_str(&escape_text(&node.tail));
}

/// Escape text for XML element content.
fn escape_text(text: &str) -> String {
    escape_xml(text, false)
}

/// Escape text for XML attribute values.
fn escape_attr(text: &str) -> String {
    escape_xml(text, true)
}

fn escape_xml(text: &str, escape_quotes: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if escape_quotes => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::super::parse;
    use super::*;

    fn roundtrip(input: &str) {
        let doc = parse(input, &BTreeMap::new()).unwrap();
        assert_eq!(doc.serialize(), input);
    }

    #[test]
    fn serializes_mixed_content() {
        roundtrip("<para>before <emphasis>strong</emphasis> after</para>");
    }

    #[test]
    fn preserves_attribute_order_and_empty_elements() {
        roundtrip(r#"<section xmlns="http://docbook.org/ns/docbook" version="5.0"><para/></section>"#);
    }

    #[test]
    fn escapes_special_characters() {
        let node = Node::new("para")
            .with_attr("title", "a \"b\" & c")
            .with_text("1 < 2 > 0 & done");
        let mut out = String::new();
        serialize_node(&node, &mut out);
        assert_eq!(
            out,
            r#"<para title="a &quot;b&quot; &amp; c">1 &lt; 2 &gt; 0 &amp; done</para>"#
        );
    }

    #[test]
    fn distinguishes_self_closing_from_empty_pair() {
        roundtrip("<section><para></para><para/></section>");
    }
}
