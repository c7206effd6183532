//! Configuration for the richtext engine.
//!
//! Parses `richtext.toml` with serde: custom tag/style definitions consumed
//! by validators and renderers, per-target stylesheet descriptors for the
//! transform engine, and per-target schema file lists for the validation
//! pipeline. Relative paths are resolved against the config file's directory
//! after parsing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Error loading a configuration file.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("cannot read config file")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML or has the wrong shape.
    #[error("cannot parse config file")]
    Parse(#[from] toml::de::Error),
}

/// One attribute of a custom tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CustomTagAttribute {
    /// Value type (`string`, `number`, `boolean`, `choice`, `link`).
    #[serde(rename = "type")]
    pub value_type: String,
    /// Whether the attribute must be present and non-empty.
    pub required: bool,
    /// Default value injected by the editor, if any.
    pub default_value: Option<String>,
    /// Allowed values for `choice` attributes.
    pub choices: Vec<String>,
}

/// Externally configured custom tag definition.
///
/// Read-only input: the engine never creates or mutates these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CustomTagDefinition {
    /// Template identifier handed to the render capability.
    pub template: String,
    /// Editor toolbar icon.
    pub icon: Option<String>,
    /// Whether the tag renders inline.
    pub is_inline: bool,
    /// Allowed attributes by name.
    pub attributes: BTreeMap<String, CustomTagAttribute>,
}

/// Externally configured custom style definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CustomStyleDefinition {
    /// Template identifier handed to the render capability.
    pub template: String,
    /// Whether the style applies to inline content.
    pub is_inline: bool,
}

/// One custom stylesheet for a conversion target.
///
/// Lower priority is imported first; later (higher priority) stylesheets win
/// on rule conflicts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StylesheetDescriptor {
    /// Stylesheet file path; relative paths resolve against the config dir.
    pub path: PathBuf,
    /// Import priority, ascending.
    #[serde(default)]
    pub priority: i32,
}

/// Engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Custom tag definitions by tag name.
    pub custom_tags: BTreeMap<String, CustomTagDefinition>,
    /// Custom style definitions by style name.
    pub custom_styles: BTreeMap<String, CustomStyleDefinition>,
    /// Custom stylesheet descriptors per conversion target.
    pub stylesheets: BTreeMap<String, Vec<StylesheetDescriptor>>,
    /// Schema file lists per validation target.
    pub schemas: BTreeMap<String, Vec<PathBuf>>,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Relative stylesheet and schema paths are resolved against the config
    /// file's parent directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&raw)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Parse configuration from a TOML string without path resolution.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for descriptors in self.stylesheets.values_mut() {
            for descriptor in descriptors {
                if descriptor.path.is_relative() {
                    descriptor.path = base.join(&descriptor.path);
                }
            }
        }
        for paths in self.schemas.values_mut() {
            for schema in paths {
                if schema.is_relative() {
                    *schema = base.join(&*schema);
                }
            }
        }
    }

    /// Stylesheet descriptors for a conversion target, empty when unset.
    #[must_use]
    pub fn stylesheets_for(&self, target: &str) -> &[StylesheetDescriptor] {
        self.stylesheets.get(target).map_or(&[], Vec::as_slice)
    }

    /// Schema paths for a validation target, empty when unset.
    #[must_use]
    pub fn schemas_for(&self, target: &str) -> &[PathBuf] {
        self.schemas.get(target).map_or(&[], Vec::as_slice)
    }
}
