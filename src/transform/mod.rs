//! JSON normalization module
//!
//! Converts HelpScout's hypermedia JSON pages into flat, snake_cased records.
//!
//! # Pipeline
//!
//! 1. **De-nest** - promote allow-listed `_embedded` sub-resources onto the record
//! 2. **Strip** - recursively remove `_links`/`_embedded` markers
//! 3. **Convert** - recursively rename keys from camelCase to snake_case
//! 4. **Post-process** - stream-specific fixups looked up from a registry

mod normalize;
mod post_process;

pub use normalize::{
    convert, convert_keys, denest_embedded, normalize_embedded_page, normalize_flat_page,
    normalize_records, strip_hypermedia,
};
pub use post_process::post_process;
