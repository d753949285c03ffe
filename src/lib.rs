//! Corpus Query State - bookmarkable urls for corpus search state
//!
//! This library translates between the query string of a corpus search url and the structured
//! state of the search forms. It supports:
//!
//! - Classifying a decoded url into the simplest pattern or explore mode that represents it
//! - Reconstructing per-annotation values from parsed pattern tokens
//! - Decoding metadata filter strings against the corpus schema
//! - Encoding state back into a length-bounded url and a bounded, deduplicated history
//! - Estimating subcorpus sizes as filters are edited
//!
//! # Example
//!
//! ```no_run
//! use corpus_query_state::{Classifier, Config, CorpusSchema};
//! use url::Url;
//!
//! let schema: CorpusSchema = serde_json::from_str(&std::fs::read_to_string("schema.json")?)?;
//! let classifier = Classifier::new(schema, Config::default());
//! let url = Url::parse("http://localhost/corpus-frontend/zeeland/search/hits?patt=%5Bword%3D%22de%22%5D")?;
//! let decoded = classifier.decode_url(&url)?;
//! println!("Pattern mode: {:?}", decoded.pattern_mode);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod cql;
pub mod decode;
pub mod encode;
pub mod error;
pub mod estimator;
pub mod filters;
pub mod history;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use decode::{Classification, Classifier, classify};
pub use encode::{EncodedUrl, Encoder, UrlSync};
pub use error::{CountError, InvariantViolation, ParseError, ReconstructError};
pub use estimator::{SubcorpusEstimate, SubcorpusEstimator};
pub use history::{HistoryLog, LoggedQuery};
pub use models::{CorpusSchema, HistoryEntry, SearchState};
