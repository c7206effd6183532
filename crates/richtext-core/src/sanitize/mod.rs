//! Pre-parse sanitizer for untrusted richtext input.
//!
//! Defense in depth against XXE and entity-expansion attacks: everything here
//! runs on raw text, before the parser ever sees the document. Comments and a
//! fixed denylist of active-content elements are stripped, and the DOCTYPE
//! internal subset is filtered down to entities that are provably inert.

pub mod doctype;

use std::sync::LazyLock;

use regex::Regex;

use crate::error::SanitizeError;
use doctype::{EntityDecl, EntityKind};

/// Elements whose whole subtree is removed, close tags included.
const ELEMENT_DENYLIST: &[&str] = &["script", "iframe", "object", "embed", "style"];

static COMMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("invalid comment regex"));

/// Strip unsafe constructs from raw XML text.
///
/// Removes XML comments, denylisted element subtrees, and unsafe DOCTYPE
/// entities together with every in-body reference to them. The output is
/// safe to hand to [`crate::loader::load`].
///
/// # Errors
///
/// Any substitution step that cannot complete is fatal; an error here means
/// the sanitizer is broken or the DOCTYPE is malformed beyond filtering,
/// never that an unsafe construct was silently passed through.
pub fn sanitize(raw: &str) -> Result<String, SanitizeError> {
    let text = COMMENT_PATTERN.replace_all(raw, "").into_owned();
    let text = strip_denylisted_elements(&text)?;
    filter_doctype(&text)
}

fn strip_denylisted_elements(text: &str) -> Result<String, SanitizeError> {
    let mut out = text.to_owned();
    for name in ELEMENT_DENYLIST {
        let pattern = format!(r"(?is)<{name}\b[^>]*/>|<{name}\b[^>]*>.*?</{name}\s*>");
        let regex = Regex::new(&pattern)
            .map_err(|e| SanitizeError::SubstitutionFailed(e.to_string()))?;
        out = regex.replace_all(&out, "").into_owned();
    }
    Ok(out)
}

/// Filter the DOCTYPE internal subset down to safe entity declarations.
///
/// A subset that needs no filtering passes through byte for byte. When
/// anything unsafe is removed the subset is rebuilt from the surviving entity
/// declarations only; non-entity declarations are dropped with it.
fn filter_doctype(text: &str) -> Result<String, SanitizeError> {
    let Some(doctype) = doctype::find_doctype(text)? else {
        return Ok(text.to_owned());
    };
    let Some(subset) = &doctype.subset else {
        return Ok(text.to_owned());
    };

    let decls = doctype::parse_subset(subset)?;
    let removed: Vec<&EntityDecl> = decls.iter().filter(|d| is_unsafe(d, &decls)).collect();
    if removed.is_empty() {
        return Ok(text.to_owned());
    }

    let safe: Vec<&EntityDecl> = decls.iter().filter(|d| !is_unsafe(d, &decls)).collect();
    let replacement = if safe.is_empty() {
        // Subset fully emptied: drop the whole DOCTYPE declaration.
        String::new()
    } else {
        let mut subset_text = String::new();
        for decl in &safe {
            let EntityKind::Internal { raw, .. } = &decl.kind else {
                unreachable!("external entities are never safe");
            };
            subset_text.push_str(&format!("<!ENTITY {} {}>", decl.name, raw));
        }
        format!("<!DOCTYPE {} [{}]>", doctype.header, subset_text)
    };

    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..doctype.start]);
    out.push_str(&replacement);
    out.push_str(&text[doctype.end..]);

    // Delete every in-body reference to a removed entity.
    for decl in &removed {
        let pattern = format!("&{};", regex::escape(&decl.name));
        let regex = Regex::new(&pattern)
            .map_err(|e| SanitizeError::SubstitutionFailed(e.to_string()))?;
        out = regex.replace_all(&out, "").into_owned();
    }

    Ok(out)
}

/// Whether a declared entity must be removed.
///
/// External and parameter entities are always unsafe. An internal entity that
/// references any other declared entity is removed as well: one pass of
/// transitive closure over the declared-entity graph, which is what an
/// expansion bomb needs to get off the ground.
fn is_unsafe(decl: &EntityDecl, all: &[EntityDecl]) -> bool {
    if decl.parameter {
        return true;
    }
    match &decl.kind {
        EntityKind::External => true,
        EntityKind::Internal { value, .. } => all
            .iter()
            .any(|other| value.contains(&format!("&{};", other.name))),
    }
}
