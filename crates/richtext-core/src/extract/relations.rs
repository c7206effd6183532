//! Relation extraction for reference tracking and search indexing.

use crate::dom::{Document, Node};
use crate::reference::Reference;

/// Elements counted as plain links.
const LINK_TAGS: &[&str] = &["link", "ezlink"];

/// Elements counted as embeds.
const EMBED_TAGS: &[&str] = &["ezembed", "ezembedinline"];

/// Identifiers referenced by one relation kind, first-seen order, deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationIds {
    /// Referenced location ids.
    pub location_ids: Vec<i64>,
    /// Referenced content ids.
    pub content_ids: Vec<i64>,
}

impl RelationIds {
    fn record(&mut self, reference: &Reference) {
        match reference {
            Reference::Location { id, .. } => push_unique(&mut self.location_ids, *id),
            Reference::Content { id, .. } => push_unique(&mut self.content_ids, *id),
            Reference::Url { .. } | Reference::Remote { .. } => {}
        }
    }
}

/// All content/location relations in a document, split by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relations {
    /// Relations carried by link elements.
    pub link: RelationIds,
    /// Relations carried by embed elements.
    pub embed: RelationIds,
}

/// Collect every `ezcontent`/`ezlocation` reference in the document.
#[must_use]
pub fn relations(doc: &Document) -> Relations {
    let mut out = Relations::default();
    walk(&doc.root, &mut out);
    out
}

fn walk(node: &Node, out: &mut Relations) {
    let local = node.local_name();
    if let Some(reference) = node.attr("xlink:href").and_then(Reference::parse) {
        if LINK_TAGS.contains(&local) {
            out.link.record(&reference);
        } else if EMBED_TAGS.contains(&local) {
            out.embed.record(&reference);
        }
    }
    for child in &node.children {
        walk(child, out);
    }
}

fn push_unique(ids: &mut Vec<i64>, id: i64) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::loader::load;

    #[test]
    fn deduplicates_in_first_seen_order() {
        let doc = load(concat!(
            r#"<section xmlns="http://docbook.org/ns/docbook">"#,
            r#"<para><link xlink:href="ezlocation://72">a</link></para>"#,
            r#"<para><link xlink:href="ezlocation://61">b</link></para>"#,
            r#"<para><link xlink:href="ezlocation://61">c</link></para>"#,
            r#"<para><link xlink:href="ezcontent://70">d</link></para>"#,
            r#"<para><link xlink:href="ezcontent://75">e</link></para>"#,
            r#"<para><link xlink:href="ezcontent://75">f</link></para>"#,
            "</section>"
        ))
        .unwrap();

        let relations = relations(&doc);
        assert_eq!(relations.link.location_ids, vec![72, 61]);
        assert_eq!(relations.link.content_ids, vec![70, 75]);
        assert_eq!(relations.embed, RelationIds::default());
    }

    #[test]
    fn embeds_are_tracked_separately_from_links() {
        let doc = load(concat!(
            r#"<section xmlns="http://docbook.org/ns/docbook">"#,
            r#"<ezembed xlink:href="ezcontent://106" view="embed"/>"#,
            r#"<ezembedinline xlink:href="ezlocation://42" view="embed-inline"/>"#,
            r#"<para><link xlink:href="ezcontent://106">x</link></para>"#,
            "</section>"
        ))
        .unwrap();

        let relations = relations(&doc);
        assert_eq!(relations.embed.content_ids, vec![106]);
        assert_eq!(relations.embed.location_ids, vec![42]);
        assert_eq!(relations.link.content_ids, vec![106]);
    }

    #[test]
    fn resolved_and_remote_references_are_ignored() {
        let doc = load(concat!(
            r#"<section xmlns="http://docbook.org/ns/docbook">"#,
            r#"<para><link xlink:href="https://example.net/">a</link></para>"#,
            r#"<para><link xlink:href="ezremote://abc">b</link></para>"#,
            "</section>"
        ))
        .unwrap();
        assert_eq!(relations(&doc), Relations::default());
    }
}
