//! Conversion pipeline between richtext surfaces.
//!
//! Documents move between the DocBook storage dialect and its input/output
//! surfaces through converters: declarative rule stylesheets compiled into a
//! priority-merged template, plus structural converters for links, embeds,
//! custom-tag rendering, and namespace migration. A dispatcher picks the
//! pipeline by the document's root namespace.

pub mod converter;
pub mod dispatcher;
pub mod error;
pub mod figure;
pub mod link;
pub mod nsmigrate;
pub mod programlisting;
pub mod template;
pub mod xslt;

pub use converter::{Aggregate, Converter};
pub use dispatcher::ConverterDispatcher;
pub use error::ConvertError;
pub use figure::FigureTable;
pub use link::{LinkResolver, RESOLVED_ATTR};
pub use nsmigrate::NamespaceMigration;
pub use programlisting::ProgramListing;
pub use template::RenderConverter;
pub use xslt::Xslt;
