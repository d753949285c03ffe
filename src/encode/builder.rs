//! Query state → url.

use tracing::warn;
use url::Url;

use super::params::SearchParams;
use crate::config::Config;
use crate::error::InvariantViolation;
use crate::models::{CorpusSchema, HistoryEntry, InterfaceDescriptor, ResultsView, SearchState};

const SEARCH_SEGMENT: &str = "search";

/// Result of projecting a state onto a url.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedUrl {
    pub url: Url,
    /// The pattern was left out to keep the url under the length limit
    pub is_truncated: bool,
    pub entry: HistoryEntry,
    pub params: Option<SearchParams>,
}

pub struct Encoder {
    schema: CorpusSchema,
    config: Config,
}

impl Encoder {
    pub fn new(schema: CorpusSchema, config: Config) -> Self {
        Self { schema, config }
    }

    pub fn schema(&self) -> &CorpusSchema {
        &self.schema
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Search parameters for `state`, see [`SearchParams::from_state`].
    pub fn params(&self, state: &SearchState) -> Result<Option<SearchParams>, InvariantViolation> {
        let tagset_main = self.active_tagset_main();
        SearchParams::from_state(state, self.schema.main_annotation_id(), tagset_main)
    }

    /// Build the url for `state`, keeping scheme, host and path prefix of `current`.
    ///
    /// Without open results the url is the bare search page. Urls longer than the configured
    /// maximum are rebuilt without the pattern.
    pub fn encode(&self, state: &SearchState, current: &Url) -> Result<EncodedUrl, InvariantViolation> {
        let params = self.params(state)?;
        let entry =
            state.to_entry(self.schema.main_annotation_id(), self.config.explore.ngram_max_size);
        let mut base = base_segments(current);

        let (Some(search), Some(view)) = (&params, state.interface.viewed_results) else {
            return Ok(EncodedUrl {
                url: with_path_and_query(current, &base, &[]),
                is_truncated: false,
                entry,
                params,
            });
        };

        base.push(view.as_str().to_string());
        let mut pairs = search.to_pairs();
        // Names the submitted form, not the editor tab that happens to be open
        let descriptor = match &state.query {
            Some(query) => query.form.descriptor(),
            None => InterfaceDescriptor::from_state(&state.interface),
        };
        if let Ok(descriptor) = serde_json::to_string(&descriptor) {
            pairs.push(("interface", descriptor));
        }

        let full = with_path_and_query(current, &base, &pairs);
        let max_length = self.config.url.max_length;
        if full.as_str().len() <= max_length {
            return Ok(EncodedUrl { url: full, is_truncated: false, entry, params });
        }

        pairs.retain(|(name, _)| *name != "patt");
        let truncated = with_path_and_query(current, &base, &pairs);
        // Filters and settings are never dropped, the url may stay over the limit
        if truncated.as_str().len() > max_length {
            warn!(length = truncated.as_str().len(), max_length, "url still too long without pattern");
        }
        Ok(EncodedUrl { url: truncated, is_truncated: true, entry, params })
    }

    fn active_tagset_main(&self) -> Option<&str> {
        self.config
            .tagset
            .as_ref()
            .filter(|_| self.schema.has_pos_annotation())
            .map(|t| t.main_annotation_id.as_str())
    }
}

/// Path segments up to and including the last `search` segment. Urls without one lose a
/// trailing results segment instead.
fn base_segments(current: &Url) -> Vec<String> {
    let mut segments: Vec<String> = current
        .path_segments()
        .map(|s| s.filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default();

    match segments.iter().rposition(|s| s.eq_ignore_ascii_case(SEARCH_SEGMENT)) {
        Some(index) => segments.truncate(index + 1),
        None => {
            if segments.last().is_some_and(|s| ResultsView::from_segment(s).is_some()) {
                segments.pop();
            }
        }
    }
    segments
}

fn with_path_and_query(current: &Url, segments: &[String], pairs: &[(&str, String)]) -> Url {
    let mut url = current.clone();
    url.set_fragment(None);
    url.set_query(None);
    if let Ok(mut path) = url.path_segments_mut() {
        // Segments are already percent-encoded as they came from a url
        path.clear();
        for segment in segments {
            path.push(&percent_encoding::percent_decode_str(segment).decode_utf8_lossy());
        }
    }
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
    }
    url
}
