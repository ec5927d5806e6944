//! Field kinds and the field renderer
//!
//! `rollbook-fields` turns a declarative [`FieldDescriptor`] plus a raw JSON
//! value into a [`FieldView`]. It knows nothing about tables or forms; both
//! build on it.
//!
//! # Architecture
//!
//! - **Closed kinds**: [`FieldType`] is exhaustively matched; tags that do not
//!   name a kind parse to [`FieldType::Unknown`] and render the raw value
//! - **Formatter first**: a descriptor's formatter runs before dispatch
//! - **Non-blocking enrichment**: API-backed kinds render [`FieldView::Loading`]
//!   and hand back an [`Enrichment`] the caller resolves when it wants
//! - **Silent degradation**: a failed lookup resolves as an empty result

pub mod options;
pub mod render;
pub mod time;
pub mod types;
pub mod view;

pub use options::StaticOptions;
pub use render::{Enrichment, FieldRenderer, Rendered};
pub use types::{Enriched, EnrichmentSource, FieldDescriptor, FieldType, FnSource, Formatter};
pub use view::{Badge, FieldView};
