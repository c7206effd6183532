//! CDATA hardening for `programlisting` elements.

use richtext_core::{Document, Node};

use crate::converter::Converter;
use crate::error::ConvertError;

const TERMINATOR: &str = "]]>";
const SPLIT: &str = "]]]]><![CDATA[>";

/// Escapes `]]>` sequences inside `programlisting` content so downstream
/// renderers can wrap the content in a CDATA section without it being
/// terminated early. Applies to the whole subtree: mixed content puts the
/// terminator in child text and tail strings too.
pub struct ProgramListing;

impl ProgramListing {
    fn rewrite(node: &mut Node, in_listing: bool) {
        let in_listing = in_listing || node.local_name() == "programlisting";
        if in_listing && node.text.contains(TERMINATOR) {
            node.text = node.text.replace(TERMINATOR, SPLIT);
        }
        for child in &mut node.children {
            Self::rewrite(child, in_listing);
            // The child's tail sits inside this node's content.
            if in_listing && child.tail.contains(TERMINATOR) {
                child.tail = child.tail.replace(TERMINATOR, SPLIT);
            }
        }
    }
}

impl Converter for ProgramListing {
    fn convert(&self, doc: &Document) -> Result<Document, ConvertError> {
        let mut out = doc.clone();
        Self::rewrite(&mut out.root, false);
        Ok(out)
    }
}
