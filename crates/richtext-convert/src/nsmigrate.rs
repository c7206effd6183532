//! Legacy namespace migration.
//!
//! Documents stored by older versions of the engine declare superseded
//! namespace URIs. Migration happens on the serialized form: each legacy URI
//! is replaced only where it appears as a whole quoted attribute value, then
//! the document is parsed again. Matching the quotes matters because the
//! legacy DocBook URI is a string prefix of the current custom-feature URI.

use richtext_core::{Document, loader, ns};

use crate::converter::Converter;
use crate::error::ConvertError;

const MIGRATIONS: [(&str, &str); 2] = [
    (ns::LEGACY_DOCBOOK, ns::DOCBOOK),
    (ns::LEGACY_CUSTOM, ns::CUSTOM),
];

/// Rewrites legacy namespace URIs to their current equivalents.
pub struct NamespaceMigration;

impl Converter for NamespaceMigration {
    fn convert(&self, doc: &Document) -> Result<Document, ConvertError> {
        let mut text = doc.serialize();
        let mut changed = false;
        for (legacy, current) in MIGRATIONS {
            let quoted = format!("\"{legacy}\"");
            if text.contains(&quoted) {
                text = text.replace(&quoted, &format!("\"{current}\""));
                changed = true;
            }
        }
        if !changed {
            return Ok(doc.clone());
        }
        tracing::debug!("migrated legacy namespace declarations");
        Ok(loader::load(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use richtext_core::loader::load;

    use super::*;

    #[test]
    fn legacy_docbook_namespace_is_rewritten() {
        let doc = load(concat!(
            r#"<section xmlns="http://ez.no/xmlns/ezpublish/docbook""#,
            r#" xmlns:ezcustom="http://ez.no/namespaces/ezpublish3/custom/">"#,
            "<para>hi</para></section>"
        ))
        .unwrap();
        let out = NamespaceMigration.convert(&doc).unwrap();
        assert_eq!(out.root_namespace(), Some(ns::DOCBOOK));
        assert_eq!(out.root.attr("xmlns:ezcustom"), Some(ns::CUSTOM));
    }

    #[test]
    fn current_custom_namespace_is_untouched() {
        let input = format!(
            r#"<section xmlns="{}" xmlns:ezcustom="{}"><para>hi</para></section>"#,
            ns::DOCBOOK,
            ns::CUSTOM
        );
        let doc = load(&input).unwrap();
        let out = NamespaceMigration.convert(&doc).unwrap();
        assert_eq!(out.serialize(), doc.serialize());
    }

    #[test]
    fn uri_in_text_content_is_not_a_declaration() {
        let doc = load(concat!(
            "<section><para>see http://ez.no/xmlns/ezpublish/docbook for details</para>",
            "</section>"
        ))
        .unwrap();
        let out = NamespaceMigration.convert(&doc).unwrap();
        assert_eq!(out.serialize(), doc.serialize());
    }
}
