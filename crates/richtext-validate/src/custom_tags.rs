//! Custom tag and style validation against external configuration.

use std::collections::BTreeMap;

use richtext_config::{Config, CustomStyleDefinition, CustomTagDefinition};
use richtext_core::{Document, Node, extract};

use crate::validator::Validator;

/// Checks every custom tag/style invocation against the configured
/// definitions.
///
/// Tags (but not styles) also get their config values cross-checked: every
/// key must be a declared attribute, and every attribute marked required must
/// be present with a non-empty value. Messages are worded for direct display
/// to the editing user.
pub struct CustomTagsValidator {
    tags: BTreeMap<String, CustomTagDefinition>,
    styles: BTreeMap<String, CustomStyleDefinition>,
}

impl CustomTagsValidator {
    /// Create a validator over the configured tag and style definitions.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            tags: config.custom_tags.clone(),
            styles: config.custom_styles.clone(),
        }
    }

    fn walk(&self, node: &Node, errors: &mut Vec<String>) {
        if matches!(node.local_name(), "eztemplate" | "eztemplateinline") {
            self.check(node, errors);
        }
        for child in &node.children {
            self.walk(child, errors);
        }
    }

    fn check(&self, node: &Node, errors: &mut Vec<String>) {
        let Some(name) = node.attr("name").filter(|n| !n.is_empty()) else {
            errors.push("Missing name attribute of RichText Custom Tag".to_owned());
            return;
        };

        if node.attr("type") == Some("style") {
            if !self.styles.contains_key(name) {
                errors.push(format!("Unknown RichText Custom Style '{name}'"));
            }
            return;
        }

        let Some(definition) = self.tags.get(name) else {
            errors.push(format!("Unknown RichText Custom Tag '{name}'"));
            return;
        };

        let values = config_values(node);
        for key in values.keys() {
            if !definition.attributes.contains_key(key.as_str()) {
                errors.push(format!(
                    "Unknown attribute '{key}' of RichText Custom Tag '{name}'"
                ));
            }
        }
        for (attr_name, attribute) in &definition.attributes {
            if !attribute.required {
                continue;
            }
            let present = values.get(attr_name).is_some_and(|value| !value.is_empty());
            if !present {
                errors.push(format!(
                    "The attribute '{attr_name}' of RichText Custom Tag '{name}' cannot be empty"
                ));
            }
        }
    }
}

/// The declared config values of a custom tag element, keyed by attribute
/// name.
fn config_values(node: &Node) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    if let Some(config) = node.child_named("ezconfig") {
        for value in config.children_named("ezvalue") {
            if let Some(key) = value.attr("key") {
                values.insert(key.to_owned(), extract::extract_text(value));
            }
        }
    }
    values
}

impl Validator for CustomTagsValidator {
    fn validate(&self, doc: &Document) -> Vec<String> {
        let mut errors = Vec::new();
        self.walk(&doc.root, &mut errors);
        errors
    }
}
