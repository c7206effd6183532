//! DOCTYPE internal-subset scanner.
//!
//! The subset is parsed with a small hand-written grammar rather than regex
//! matching: nested-entity detection has to see the declared-entity graph,
//! and quoted literals may contain any of the delimiter characters a pattern
//! would trip over.

use std::collections::BTreeMap;

use crate::error::SanitizeError;

/// What a declared entity expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    /// Internal entity with a literal replacement value.
    Internal {
        /// Replacement text as written, quotes included.
        raw: String,
        /// Replacement text with predefined references decoded.
        value: String,
    },
    /// External (`SYSTEM`/`PUBLIC`) entity.
    External,
}

/// One `<!ENTITY ...>` declaration from the internal subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDecl {
    /// Entity name.
    pub name: String,
    /// Parameter entity (`<!ENTITY % ...>`).
    pub parameter: bool,
    /// Replacement kind.
    pub kind: EntityKind,
}

/// Location and content of a `<!DOCTYPE ...>` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctype {
    /// Byte range of the whole declaration in the source text.
    pub start: usize,
    /// End of the declaration (exclusive, past the closing `>`).
    pub end: usize,
    /// Text between `<!DOCTYPE` and the subset or closing `>`.
    pub header: String,
    /// Internal subset between `[` and `]`, if present.
    pub subset: Option<String>,
}

/// Scan `text` for its DOCTYPE declaration.
///
/// Tracks quoting and the `[...]` subset so a `>` inside either does not end
/// the scan early. Returns an error for an unterminated declaration.
pub fn find_doctype(text: &str) -> Result<Option<Doctype>, SanitizeError> {
    let Some(start) = text.find("<!DOCTYPE") else {
        return Ok(None);
    };
    let body = &text[start + "<!DOCTYPE".len()..];

    let mut header_end = None;
    let mut subset: Option<String> = None;
    let mut quote: Option<char> = None;
    let mut subset_start = None;

    for (i, c) in body.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '[' if subset_start.is_none() => {
                header_end = Some(i);
                subset_start = Some(i + 1);
            }
            ']' => {
                if let Some(s) = subset_start.take() {
                    subset = Some(body[s..i].to_owned());
                    subset_start = Some(usize::MAX); // consumed
                }
            }
            '>' if subset_start.is_none() || subset.is_some() => {
                let header = header_end.map_or(&body[..i], |e| &body[..e]);
                return Ok(Some(Doctype {
                    start,
                    end: start + "<!DOCTYPE".len() + i + 1,
                    header: header.trim().to_owned(),
                    subset,
                }));
            }
            _ => {}
        }
    }

    Err(SanitizeError::MalformedDoctype(
        "unterminated DOCTYPE declaration".to_owned(),
    ))
}

/// Parse every entity declaration in an internal subset.
///
/// Other markup declarations (`<!ELEMENT>`, `<!ATTLIST>`, `<!NOTATION>`) are
/// skipped: they declare no expandable content, so the sanitizer has nothing
/// to filter in them. Anything that is not a markup declaration is a
/// sanitization failure.
pub fn parse_subset(subset: &str) -> Result<Vec<EntityDecl>, SanitizeError> {
    let mut decls = Vec::new();
    let mut rest = subset.trim_start();

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!ENTITY") {
            let (decl, after) = parse_entity_decl(after)?;
            decls.push(decl);
            rest = after.trim_start();
        } else if rest.starts_with("<!") {
            rest = close_decl(rest)?.trim_start();
        } else {
            return Err(SanitizeError::MalformedDoctype(format!(
                "unsupported content in internal subset near '{}'",
                rest.chars().take(24).collect::<String>()
            )));
        }
    }

    Ok(decls)
}

fn parse_entity_decl(input: &str) -> Result<(EntityDecl, &str), SanitizeError> {
    let rest = skip_ws(input)?;
    let (parameter, rest) = match rest.strip_prefix('%') {
        Some(after) => (true, skip_ws(after)?),
        None => (false, rest),
    };

    let name_len = rest
        .find(|c: char| c.is_whitespace())
        .ok_or_else(|| malformed("entity declaration missing value"))?;
    let name = rest[..name_len].to_owned();
    if name.is_empty() {
        return Err(malformed("entity declaration missing name"));
    }
    let rest = skip_ws(&rest[name_len..])?;

    if rest.starts_with("SYSTEM") || rest.starts_with("PUBLIC") {
        let rest = close_decl(rest)?;
        return Ok((
            EntityDecl {
                name,
                parameter,
                kind: EntityKind::External,
            },
            rest,
        ));
    }

    let quote = rest
        .chars()
        .next()
        .filter(|c| *c == '"' || *c == '\'')
        .ok_or_else(|| malformed("entity value is not a quoted literal"))?;
    let inner = &rest[1..];
    let end = inner
        .find(quote)
        .ok_or_else(|| malformed("unterminated entity value"))?;
    let raw = rest[..end + 2].to_owned();
    let value = decode_predefined(&inner[..end]);
    let rest = close_decl(&inner[end + 1..])?;

    Ok((
        EntityDecl {
            name,
            parameter,
            kind: EntityKind::Internal { raw, value },
        },
        rest,
    ))
}

/// Skip to just past the closing `>` of a declaration.
fn close_decl(input: &str) -> Result<&str, SanitizeError> {
    let mut quote: Option<char> = None;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Ok(&input[i + 1..]),
            (None, _) => {}
        }
    }
    Err(malformed("unterminated entity declaration"))
}

fn skip_ws(input: &str) -> Result<&str, SanitizeError> {
    let trimmed = input.trim_start();
    if trimmed.len() == input.len() {
        return Err(malformed("expected whitespace in entity declaration"));
    }
    Ok(trimmed)
}

fn malformed(msg: &str) -> SanitizeError {
    SanitizeError::MalformedDoctype(msg.to_owned())
}

fn decode_predefined(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Surviving internal entities of sanitized text, keyed by name.
///
/// Used by the loader to substitute references during parse. Sanitized text
/// only ever contains safe internal declarations, so external kinds are
/// skipped defensively rather than rejected.
pub fn internal_entities(text: &str) -> Result<BTreeMap<String, String>, SanitizeError> {
    let Some(doctype) = find_doctype(text)? else {
        return Ok(BTreeMap::new());
    };
    let Some(subset) = doctype.subset else {
        return Ok(BTreeMap::new());
    };

    let mut map = BTreeMap::new();
    for decl in parse_subset(&subset)? {
        if let EntityKind::Internal { value, .. } = decl.kind {
            if !decl.parameter {
                map.insert(decl.name, value);
            }
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn finds_doctype_with_subset() {
        let text = r#"<!DOCTYPE section [<!ENTITY a "1">]><section/>"#;
        let doctype = find_doctype(text).unwrap().unwrap();
        assert_eq!(doctype.header, "section");
        assert_eq!(doctype.subset.as_deref(), Some(r#"<!ENTITY a "1">"#));
        assert_eq!(&text[doctype.start..doctype.end], r#"<!DOCTYPE section [<!ENTITY a "1">]>"#);
    }

    #[test]
    fn parses_internal_and_external_declarations() {
        let decls = parse_subset(
            r#"<!ENTITY safe "hello">
               <!ENTITY evil SYSTEM "file:///etc/passwd">
               <!ENTITY % param "x">"#,
        )
        .unwrap();
        assert_eq!(decls.len(), 3);
        assert_eq!(decls[0].name, "safe");
        assert_eq!(
            decls[0].kind,
            EntityKind::Internal {
                raw: r#""hello""#.to_owned(),
                value: "hello".to_owned()
            }
        );
        assert_eq!(decls[1].kind, EntityKind::External);
        assert!(decls[2].parameter);
    }

    #[test]
    fn non_entity_declarations_are_skipped() {
        let decls = parse_subset(
            r#"<!ELEMENT section (para*)>
               <!ATTLIST section id CDATA ">">
               <!ENTITY a "1">"#,
        )
        .unwrap();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "a");
    }

    #[test]
    fn rejects_non_declaration_content() {
        let err = parse_subset("not a declaration").unwrap_err();
        assert!(matches!(err, SanitizeError::MalformedDoctype(_)));
    }

    #[test]
    fn quoted_bracket_does_not_end_subset() {
        let text = r#"<!DOCTYPE section [<!ENTITY a "]">]><section/>"#;
        let doctype = find_doctype(text).unwrap().unwrap();
        assert_eq!(doctype.subset.as_deref(), Some(r#"<!ENTITY a "]">"#));
    }
}
