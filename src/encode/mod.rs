//! Encoding of query state into urls.
//!
//! - [`builder`] - url building with the length limit
//! - [`params`] - search parameters of the viewed results
//! - [`sync`] - pushing urls to navigation and the history log

pub mod builder;
pub mod params;
pub mod sync;

pub use builder::{EncodedUrl, Encoder};
pub use params::SearchParams;
pub use sync::{MemoryNavigator, Navigator, SyncOutcome, UrlSync};
