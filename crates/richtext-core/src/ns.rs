//! Namespace URIs understood by the engine.

/// DocBook storage dialect (the canonical internal form).
pub const DOCBOOK: &str = "http://docbook.org/ns/docbook";

/// Editable XHTML-like surface produced for the online editor.
pub const XHTML5_EDIT: &str = "http://ez.no/namespaces/ezpublish5/xhtml5/edit";

/// Rendered XHTML output surface.
pub const XHTML5_OUTPUT: &str = "http://ez.no/namespaces/ezpublish5/xhtml5";

/// Custom tag/style vocabulary embedded in DocBook documents.
pub const CUSTOM: &str = "http://ez.no/xmlns/ezpublish/docbook/custom";

/// XLink, carrier of every `xlink:href` reference attribute.
pub const XLINK: &str = "http://www.w3.org/1999/xlink";

/// Legacy DocBook-dialect namespace rewritten by the migration converter.
pub const LEGACY_DOCBOOK: &str = "http://ez.no/xmlns/ezpublish/docbook";

/// Legacy custom-tag namespace rewritten by the migration converter.
pub const LEGACY_CUSTOM: &str = "http://ez.no/namespaces/ezpublish3/custom/";
