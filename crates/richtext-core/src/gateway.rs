//! Capability traits the engine calls out through.
//!
//! The hosting repository services own content storage, permissions, URL
//! routing, and template rendering; the engine only ever sees these seams.
//! Implementations are expected to be synchronous and may block on their own
//! I/O. Converters and validators hold them behind `Arc`, so every capability
//! is `Send + Sync`.

use serde_json::{Map, Value};

/// Minimal view of a content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentInfo {
    /// Content identifier.
    pub id: i64,
    /// The item's main location.
    pub main_location_id: Option<i64>,
}

/// Minimal view of a location in the content tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Location identifier.
    pub id: i64,
    /// Identifier of the content item at this location.
    pub content_id: i64,
}

/// Failure resolving a content or location identifier.
///
/// `NotFound` and `Unauthorized` are recoverable: converters degrade to a
/// placeholder value and log. Anything else propagates.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LookupError {
    /// The identifier resolves to nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// The current user may not read the target.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Infrastructure failure; never degraded.
    #[error("lookup failed: {0}")]
    Other(String),
}

/// Content/location lookup capability.
pub trait ContentLookup: Send + Sync {
    /// Load content info by content id.
    fn load_content_info(&self, id: i64) -> Result<ContentInfo, LookupError>;

    /// Load a location by location id.
    fn load_location(&self, id: i64) -> Result<Location, LookupError>;

    /// Load content info by remote id.
    fn load_content_info_by_remote_id(&self, remote_id: &str) -> Result<ContentInfo, LookupError>;
}

/// URL generation capability.
pub trait UrlGenerator: Send + Sync {
    /// Absolute URL for a location.
    fn generate(&self, location: &Location) -> String;
}

/// Permission check capability, consumed by the rendering orchestrator only.
pub trait PermissionResolver: Send + Sync {
    /// Whether the current user may perform `action` on the content item.
    fn can_user(&self, action: &str, content: &ContentInfo) -> bool;
}

/// Nested parameter map handed to the render capability.
pub type RenderParams = Map<String, Value>;

/// Template/embed rendering capability.
///
/// A `None` return means the renderer chose not to produce output; the
/// conversion continues without a rendered representation.
pub trait TemplateRenderer: Send + Sync {
    /// Render a named custom tag or style.
    fn render_template(
        &self,
        name: &str,
        kind: &str,
        params: &RenderParams,
        is_inline: bool,
    ) -> Option<String>;

    /// Render a content embed.
    fn render_content_embed(
        &self,
        content_id: i64,
        view_type: &str,
        params: &RenderParams,
        is_inline: bool,
    ) -> Option<String>;

    /// Render a location embed.
    fn render_location_embed(
        &self,
        location_id: i64,
        view_type: &str,
        params: &RenderParams,
        is_inline: bool,
    ) -> Option<String>;
}
