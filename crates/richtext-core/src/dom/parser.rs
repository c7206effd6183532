//! quick-xml event parser building the owned document tree.

use std::collections::BTreeMap;
use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::{Document, Node};
use crate::error::{LoadError, ParseDiagnostic, Severity};

/// Parse sanitized XML text into a [`Document`].
///
/// `entities` maps internal-subset entity names (sanitizer-approved) to their
/// replacement text; references to anything else are a parse error. CDATA
/// sections are folded into plain text so downstream converters never deal
/// with escaping variants.
pub fn parse(input: &str, entities: &BTreeMap<String, String>) -> Result<Document, LoadError> {
    let mut reader = Reader::from_reader(input.as_bytes());
    reader.config_mut().trim_text(false);

    let ctx = Ctx { input, entities };
    let mut buf = Vec::new();
    let mut doc = Document::default();
    let mut seen_root = false;

    loop {
        let pos = position(&reader);
        match reader.read_event_into(&mut buf).map_err(|e| ctx.fatal(pos, &e))? {
            Event::Decl(e) => {
                let content = String::from_utf8_lossy(&e).into_owned();
                doc.decl = Some(format!("<?{content}?>"));
            }
            Event::DocType(e) => {
                let content = reader.decoder().decode(&e).map_err(|e| ctx.fatal(pos, &e))?;
                doc.doctype = Some(content.trim().to_owned());
            }
            Event::Start(e) => {
                ctx.check_single_root(seen_root, pos)?;
                seen_root = true;
                let mut root = ctx.element(&reader, &e, false)?;
                ctx.read_children(&mut reader, &mut root)?;
                doc.root = root;
            }
            Event::Empty(e) => {
                ctx.check_single_root(seen_root, pos)?;
                seen_root = true;
                doc.root = ctx.element(&reader, &e, true)?;
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e).map_err(|e| ctx.fatal(pos, &e))?;
                if !text.trim().is_empty() {
                    return Err(ctx.error(pos, "content outside the root element"));
                }
            }
            Event::GeneralRef(_) => {
                return Err(ctx.error(pos, "entity reference outside the root element"));
            }
            Event::Comment(_) | Event::PI(_) => {}
            Event::End(_) => {
                return Err(ctx.error(pos, "close tag outside the root element"));
            }
            Event::CData(_) => {
                return Err(ctx.error(pos, "CDATA outside the root element"));
            }
            Event::Eof => break,
        }
        buf.clear();
    }

    if seen_root {
        Ok(doc)
    } else {
        Err(ctx.error(input.len(), "document has no root element"))
    }
}

struct Ctx<'a> {
    input: &'a str,
    entities: &'a BTreeMap<String, String>,
}

impl Ctx<'_> {
    fn read_children<R: BufRead>(
        &self,
        reader: &mut Reader<R>,
        parent: &mut Node,
    ) -> Result<(), LoadError> {
        let mut buf = Vec::new();

        loop {
            let pos = position(reader);
            match reader.read_event_into(&mut buf).map_err(|e| self.fatal(pos, &e))? {
                Event::Start(e) => {
                    let mut child = self.element(reader, &e, false)?;
                    self.read_children(reader, &mut child)?;
                    parent.children.push(child);
                }
                Event::Empty(e) => {
                    parent.children.push(self.element(reader, &e, true)?);
                }
                Event::Text(e) => {
                    let text = reader.decoder().decode(&e).map_err(|e| self.fatal(pos, &e))?;
                    append_text(parent, &text);
                }
                Event::CData(e) => {
                    // Literal-data sections become ordinary text.
                    let text = String::from_utf8_lossy(&e).into_owned();
                    append_text(parent, &text);
                }
                Event::GeneralRef(e) => {
                    let name = reader.decoder().decode(&e).map_err(|e| self.fatal(pos, &e))?;
                    let Some(text) = resolve_entity(&name, self.entities) else {
                        return Err(self.error(pos, &format!("undefined entity '&{name};'")));
                    };
                    append_text(parent, &text);
                }
                Event::End(_) => return Ok(()),
                Event::Eof => {
                    return Err(self.error(pos, &format!("unclosed element <{}>", parent.tag)));
                }
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
            buf.clear();
        }
    }

    fn element<R: BufRead>(
        &self,
        reader: &Reader<R>,
        start: &BytesStart<'_>,
        self_closing: bool,
    ) -> Result<Node, LoadError> {
        let pos = position(reader);
        let tag = reader
            .decoder()
            .decode(start.name().as_ref())
            .map_err(|e| self.fatal(pos, &e))?
            .into_owned();

        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| self.fatal(pos, &e))?;
            let name = reader
                .decoder()
                .decode(attr.key.as_ref())
                .map_err(|e| self.fatal(pos, &e))?
                .into_owned();
            let raw = reader
                .decoder()
                .decode(&attr.value)
                .map_err(|e| self.fatal(pos, &e))?;
            let value = self
                .unescape(&raw)
                .ok_or_else(|| self.error(pos, &format!("undefined entity in attribute '{name}'")))?;
            attrs.push((name, value));
        }

        Ok(Node {
            tag,
            attrs,
            self_closing,
            ..Default::default()
        })
    }

    /// Expand entity references inside an attribute value.
    fn unescape(&self, raw: &str) -> Option<String> {
        if !raw.contains('&') {
            return Some(raw.to_owned());
        }
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(start) = rest.find('&') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let end = after.find(';')?;
            out.push_str(&resolve_entity(&after[..end], self.entities)?);
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Some(out)
    }

    fn check_single_root(&self, seen_root: bool, pos: usize) -> Result<(), LoadError> {
        if seen_root {
            Err(self.error(pos, "more than one root element"))
        } else {
            Ok(())
        }
    }

    fn diagnostic(&self, pos: usize, severity: Severity, message: String) -> LoadError {
        let (line, column) = line_column(self.input, pos);
        LoadError::invalid(ParseDiagnostic {
            line,
            column,
            severity,
            message,
        })
    }

    fn error(&self, pos: usize, message: &str) -> LoadError {
        self.diagnostic(pos, Severity::Error, message.to_owned())
    }

    fn fatal(&self, pos: usize, err: &dyn std::fmt::Display) -> LoadError {
        self.diagnostic(pos, Severity::Fatal, err.to_string())
    }
}

fn append_text(parent: &mut Node, text: &str) {
    match parent.children.last_mut() {
        Some(last) => last.tail.push_str(text),
        None => parent.text.push_str(text),
    }
}

/// Resolve a general entity reference to its replacement text.
fn resolve_entity(name: &str, entities: &BTreeMap<String, String>) -> Option<String> {
    match name {
        "amp" => Some("&".to_owned()),
        "lt" => Some("<".to_owned()),
        "gt" => Some(">".to_owned()),
        "quot" => Some("\"".to_owned()),
        "apos" => Some("'".to_owned()),
        _ => {
            if let Some(code) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                let code = u32::from_str_radix(code, 16).ok()?;
                char::from_u32(code).map(String::from)
            } else if let Some(code) = name.strip_prefix('#') {
                let code: u32 = code.parse().ok()?;
                char::from_u32(code).map(String::from)
            } else {
                entities.get(name).cloned()
            }
        }
    }
}

fn position<R>(reader: &Reader<R>) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX)
}

/// 1-based line and column of a byte offset.
fn line_column(input: &str, pos: usize) -> (usize, usize) {
    let upto = &input.as_bytes()[..pos.min(input.len())];
    let line = upto.iter().filter(|&&b| b == b'\n').count() + 1;
    let column = upto
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(upto.len() + 1, |nl| upto.len() - nl);
    (line, column)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn no_entities() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[test]
    fn parses_mixed_content_with_tails() {
        let doc = parse(
            "<para>before <emphasis>strong</emphasis> after</para>",
            &no_entities(),
        )
        .unwrap();
        assert_eq!(doc.root.tag, "para");
        assert_eq!(doc.root.text, "before ");
        assert_eq!(doc.root.children[0].text, "strong");
        assert_eq!(doc.root.children[0].tail, " after");
    }

    #[test]
    fn folds_cdata_into_text() {
        let doc = parse(
            "<programlisting><![CDATA[if (a < b) {}]]></programlisting>",
            &no_entities(),
        )
        .unwrap();
        assert_eq!(doc.root.text, "if (a < b) {}");
    }

    #[test]
    fn substitutes_declared_entities() {
        let mut entities = BTreeMap::new();
        entities.insert("nbsp".to_owned(), "\u{a0}".to_owned());
        let doc = parse("<para>a&nbsp;b</para>", &entities).unwrap();
        assert_eq!(doc.root.text, "a\u{a0}b");
    }

    #[test]
    fn undefined_entity_is_an_error() {
        let err = parse("<para>&mystery;</para>", &no_entities()).unwrap_err();
        let LoadError::InvalidDocument { diagnostics } = err;
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("mystery"));
    }

    #[test]
    fn keeps_declaration_and_doctype() {
        let doc = parse(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<section/>",
            &no_entities(),
        )
        .unwrap();
        assert_eq!(
            doc.decl.as_deref(),
            Some("<?xml version=\"1.0\" encoding=\"UTF-8\"?>")
        );
        assert!(doc.root.self_closing);
    }

    #[test]
    fn malformed_document_reports_line_and_column() {
        let err = parse("<section>\n  <para>\n</section>", &no_entities()).unwrap_err();
        let LoadError::InvalidDocument { diagnostics } = err;
        assert_eq!(diagnostics[0].severity, Severity::Fatal);
        assert!(diagnostics[0].line >= 2);
    }

    #[test]
    fn rejects_multiple_roots() {
        let err = parse("<a/><b/>", &no_entities()).unwrap_err();
        let LoadError::InvalidDocument { diagnostics } = err;
        assert!(diagnostics[0].message.contains("root"));
    }
}
