//! Data model for query state.
//!
//! - [`CorpusSchema`] - read-only corpus description (annotations, metadata fields, totals)
//! - [`FilterValue`] - constraint on one metadata field
//! - [`PatternState`] / [`PatternQuery`] - pattern editors and the authoritative submitted pattern
//! - [`ExploreState`] / [`ExploreQuery`] - frequency and n-gram editors
//! - [`HistoryEntry`] - immutable snapshot used for navigation and the history log
//! - [`SearchState`] - live state the url is projected from
//!
//! All types are plain values: they are cloned across module boundaries, never shared.

pub mod explore;
pub mod filter;
pub mod history;
pub mod interface;
pub mod pattern;
pub mod results;
pub mod schema;
pub mod state;

pub use explore::{ExploreMode, ExploreQuery, ExploreState, FrequencyState, NgramState, NgramToken};
pub use filter::{FilterMap, FilterUiType, FilterValue};
pub use history::HistoryEntry;
pub use interface::{Form, InterfaceDescriptor, InterfaceState, ResultsView};
pub use pattern::{
    AnnotationValue, AnnotationValues, ExtendedPattern, PatternMode, PatternQuery, PatternState,
};
pub use results::{GlobalSettings, SampleMode, ViewSettings};
pub use schema::{Annotation, CorpusSchema, MetadataField};
pub use state::{QueryForm, SearchState, SubmittedQuery};
