//! Paginated fetch engine
//!
//! Drives one endpoint page-by-page and yields normalized records lazily.
//!
//! # Features
//!
//! - **Pull-based**: callers ask for the next page; nothing is prefetched
//! - **Replication windows**: bookmark and `start`/`end` query parameters
//!   built from the effective cursor
//! - **Page-0 quirk**: a reported page number of 0 ends pagination cleanly
//! - **Page ceiling**: a hard stop at [`MAX_PAGES`] guards against a
//!   server that never reports the last page

mod pager;

pub use pager::{FetchQuery, Pager, MAX_PAGES};
