//! Decoding of urls into query state.
//!
//! - [`params`] - raw access to path segments and query parameters
//! - [`attributes`] - flattening a parsed pattern into extended editor values
//! - [`classify`] - choosing editors and building the [`HistoryEntry`](crate::models::HistoryEntry)

pub mod attributes;
pub mod classify;
pub mod params;

pub use attributes::reconstruct;
pub use classify::{Classification, Classifier, classify};
pub use params::UrlParams;
