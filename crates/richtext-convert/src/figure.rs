//! Figure-to-table attribute propagation.

use richtext_core::{Document, Node};

use crate::converter::Converter;
use crate::error::ConvertError;

/// Copies presentation attributes from a `figure` element onto the single
/// `table` it wraps, so table styling survives the figure wrapper being
/// dropped by later stylesheet rules.
pub struct FigureTable;

impl FigureTable {
    fn rewrite(node: &mut Node) {
        if node.local_name() == "figure" {
            Self::propagate(node);
        }
        for child in &mut node.children {
            Self::rewrite(child);
        }
    }

    fn propagate(figure: &mut Node) {
        let mut tables = figure
            .children
            .iter()
            .enumerate()
            .filter(|(_, c)| c.local_name() == "table");
        let Some((index, _)) = tables.next() else {
            return;
        };
        if tables.next().is_some() {
            return;
        }

        let copied: Vec<(String, String)> = figure
            .attrs
            .iter()
            .filter(|(name, _)| name == "class" || name.starts_with("data-ezattribute-"))
            .cloned()
            .collect();
        let table = &mut figure.children[index];
        for (name, value) in copied {
            if table.attr(&name).is_none() {
                table.set_attr(&name, value);
            }
        }
    }
}

impl Converter for FigureTable {
    fn convert(&self, doc: &Document) -> Result<Document, ConvertError> {
        let mut out = doc.clone();
        Self::rewrite(&mut out.root);
        Ok(out)
    }
}
