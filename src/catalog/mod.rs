//! Catalog parsing and selection resolution
//!
//! Parses an externally supplied catalog and resolves which streams and
//! fields take part in a sync.
//!
//! # Features
//!
//! - **Catalog Parsing**: Deserializes the catalog document and its
//!   breadcrumb-addressed metadata entries
//! - **Stream Selection**: A stream runs only when its stream-level
//!   metadata marks it selected
//! - **Field Inclusion**: Primary-key and replication-key fields are
//!   always automatic; other fields honor the catalog's inclusion and
//!   selection flags
//! - **Record Filtering**: Drops deselected, unsupported, and
//!   out-of-schema fields before emission

mod resolver;
mod types;

pub use resolver::{resolve, FieldInclusion, FieldRule, Selection, StreamSelection};
pub use types::{Catalog, CatalogEntry, MetadataEntry};
