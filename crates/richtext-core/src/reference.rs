//! `scheme://identifier#fragment` reference model.
//!
//! References only ever exist as serialized attribute text on link and embed
//! elements; this type is the parsed view used while converting and
//! validating. On store, remote references are rewritten to content
//! references; on render, content/location references become absolute URLs.

use std::fmt;

/// A parsed reference from a link or embed attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// `ezurl://id#fragment` — stored URL placeholder.
    Url {
        /// URL record identifier; may be empty while a store is in flight.
        id: String,
        /// Optional fragment carried through resolution.
        fragment: Option<String>,
    },
    /// `ezcontent://id#fragment` — content item reference.
    Content {
        /// Content identifier.
        id: i64,
        /// Optional fragment carried through resolution.
        fragment: Option<String>,
    },
    /// `ezlocation://id#fragment` — location reference.
    Location {
        /// Location identifier.
        id: i64,
        /// Optional fragment carried through resolution.
        fragment: Option<String>,
    },
    /// `ezremote://remoteId#fragment` — remote content reference.
    Remote {
        /// Remote content identifier.
        remote_id: String,
        /// Optional fragment carried through resolution.
        fragment: Option<String>,
    },
}

impl Reference {
    /// Parse a reference attribute value, returning `None` for values that
    /// use no recognized internal scheme (already-resolved URLs, anchors).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let (scheme, rest) = value.split_once("://")?;
        let (id, fragment) = match rest.split_once('#') {
            Some((id, frag)) => (id, Some(frag.to_owned())),
            None => (rest, None),
        };
        match scheme {
            "ezurl" => Some(Self::Url {
                id: id.to_owned(),
                fragment,
            }),
            "ezcontent" => Some(Self::Content {
                id: id.parse().ok()?,
                fragment,
            }),
            "ezlocation" => Some(Self::Location {
                id: id.parse().ok()?,
                fragment,
            }),
            "ezremote" => {
                if id.is_empty() {
                    return None;
                }
                Some(Self::Remote {
                    remote_id: id.to_owned(),
                    fragment,
                })
            }
            _ => None,
        }
    }

    /// The fragment, for any scheme.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        match self {
            Self::Url { fragment, .. }
            | Self::Content { fragment, .. }
            | Self::Location { fragment, .. }
            | Self::Remote { fragment, .. } => fragment.as_deref(),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (scheme, id) = match self {
            Self::Url { id, .. } => ("ezurl", id.clone()),
            Self::Content { id, .. } => ("ezcontent", id.to_string()),
            Self::Location { id, .. } => ("ezlocation", id.to_string()),
            Self::Remote { remote_id, .. } => ("ezremote", remote_id.clone()),
        };
        write!(f, "{scheme}://{id}")?;
        if let Some(fragment) = self.fragment() {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}
