//! Schema-level validation: grammar files plus assert stylesheets.

use std::path::{Path, PathBuf};

use richtext_convert::{Converter, Xslt};
use richtext_core::{Document, extract};

use crate::error::SchemaError;
use crate::libxml2::{Grammar, GrammarKind};
use crate::validator::Validator;

enum Backend {
    Grammar(Grammar),
    Asserts(Xslt),
}

struct CompiledSchema {
    path: PathBuf,
    backend: Backend,
}

/// Validates a document against an ordered list of schema files.
///
/// The backend is chosen by file extension: `.rng` and `.xsd` compile into
/// libxml2 grammars, `.toml` files are assert stylesheets run through the
/// transform engine with each `failed-assert` result formatted as
/// `"<location>: <message>"`. Schemas are compiled up front so validation
/// itself cannot fail, only report.
pub struct SchemaValidator {
    schemas: Vec<CompiledSchema>,
}

impl SchemaValidator {
    /// Compile every schema file.
    ///
    /// # Errors
    ///
    /// [`SchemaError`] when a file cannot be read, does not compile, or has
    /// an extension no backend handles.
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Result<Self, SchemaError> {
        let mut schemas = Vec::new();
        for path in paths {
            let backend = match path.extension().and_then(|e| e.to_str()) {
                Some("rng") => compile_grammar(GrammarKind::RelaxNg, &path)?,
                Some("xsd") => compile_grammar(GrammarKind::XmlSchema, &path)?,
                Some("toml") => Backend::Asserts(Xslt::new(path.clone(), Vec::new())),
                _ => return Err(SchemaError::UnsupportedExtension(path)),
            };
            schemas.push(CompiledSchema { path, backend });
        }
        Ok(Self { schemas })
    }
}

fn compile_grammar(kind: GrammarKind, path: &Path) -> Result<Backend, SchemaError> {
    let source = std::fs::read(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let grammar =
        Grammar::compile(kind, &source).ok_or_else(|| SchemaError::Grammar(path.to_path_buf()))?;
    Ok(Backend::Grammar(grammar))
}

impl Validator for SchemaValidator {
    fn validate(&self, doc: &Document) -> Vec<String> {
        let serialized = doc.serialize();
        let mut errors = Vec::new();
        for schema in &self.schemas {
            match &schema.backend {
                Backend::Grammar(grammar) => errors.extend(grammar.validate(&serialized)),
                Backend::Asserts(transform) => match transform.convert(doc) {
                    Ok(report) => {
                        for failed in report.root.children_named("failed-assert") {
                            let message = extract::extract_text(failed);
                            match failed.attr("location") {
                                Some(location) => errors.push(format!("{location}: {message}")),
                                None => errors.push(message),
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            schema = %schema.path.display(),
                            error = %e,
                            "assert schema could not run"
                        );
                        errors.push(format!(
                            "assert schema {} could not run: {e}",
                            schema.path.display()
                        ));
                    }
                },
            }
        }
        errors
    }
}
