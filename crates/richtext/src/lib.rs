//! Richtext conversion and validation engine.
//!
//! Rich text is stored as a constrained DocBook dialect and moved between an
//! editable XHTML-like surface, a rendered output surface, and the stored
//! form by namespace-dispatched converter pipelines, with schema-level and
//! business-rule validation on the way in. This crate composes the engine
//! crates into the two entry points external callers use: [`InputHandler`]
//! for accepting text and [`OutputRenderer`] for producing it.

pub mod error;
pub mod input;
pub mod render;

pub use error::Error;
pub use input::InputHandler;
pub use render::{OutputRenderer, PermissionGatedRenderer};

pub use richtext_config::Config;
pub use richtext_convert::{Aggregate, Converter, ConverterDispatcher};
pub use richtext_core::{Document, Node};
pub use richtext_validate::{Validator, ValidatorAggregate, ValidatorDispatcher};

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use richtext_convert::Xslt;
    use richtext_core::ns;

    use super::*;

    const OUTPUT_SHEET: &str = r#"
[[rule]]
match = "section"
rename = "div"
drop_attrs = ["xmlns"]

[[rule]]
match = "para"
rename = "p"
"#;

    #[test]
    fn accepted_input_renders_to_the_output_surface() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = dir.path().join("output.toml");
        std::fs::write(&sheet, OUTPUT_SHEET).unwrap();

        let handler = InputHandler::new(
            ConverterDispatcher::new().with_noop(ns::DOCBOOK),
            ValidatorDispatcher::new().with_noop(ns::DOCBOOK),
        );
        let doc = handler
            .from_string(concat!(
                r#"<section xmlns="http://docbook.org/ns/docbook">"#,
                "<!-- note --><para>hello</para></section>"
            ))
            .unwrap();
        assert_eq!(handler.validate(&doc).unwrap(), Vec::<String>::new());

        let renderer = OutputRenderer::new(Aggregate::new().with(Xslt::new(sheet, Vec::new())));
        assert_eq!(renderer.render(&doc).unwrap(), "<div><p>hello</p></div>");
    }
}
