//! Post-resolution enrichment stages
//!
//! Runs after a resolver has produced a record, in order:
//! 1. Favicon normalization. Failure here fails the whole resolution.
//! 2. Properties lookup. Failure here is absorbed.

mod favicon;
mod properties;

pub use favicon::{favicon_data_url, normalize_favicon, shrink_to_favicon, FAVICON_SIZE};
pub use properties::{identity_request, lookup_properties, IDENTITY_PATH};
