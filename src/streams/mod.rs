//! Stream descriptor module
//!
//! Static metadata for every HelpScout stream: endpoint paths, replication
//! modes, key fields, parent/child linkage, and embedded JSON schemas.

mod descriptor;
mod registry;

pub use descriptor::{PageEnvelope, ParentLink, ReplicationMode, StreamDescriptor};
pub use registry::{schema, stream, top_level_streams, SCHEMAS, STREAMS};

#[cfg(test)]
mod tests;
