use serde::Serialize;

use crate::cql::pattern_string;
use crate::error::InvariantViolation;
use crate::filters::filter_string;
use crate::models::{SampleMode, SearchState};

/// Search parameters of the viewed results, as sent to the search backend and written to the url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchParams {
    pub filter: Option<String>,
    pub first: u64,
    pub group: Option<String>,
    pub number: u32,
    pub patt: Option<String>,
    pub sample: Option<u32>,
    pub samplenum: Option<u32>,
    pub sampleseed: Option<i64>,
    pub sort: Option<String>,
    pub viewgroup: Option<String>,
    pub wordsaroundhit: Option<u32>,
}

impl SearchParams {
    /// Parameters for `state`, or `None` when no results are open or nothing was submitted.
    ///
    /// Fails when a sample size is set without a seed: every page would draw another sample.
    pub fn from_state(
        state: &SearchState,
        main_annotation_id: &str,
        tagset_main: Option<&str>,
    ) -> Result<Option<Self>, InvariantViolation> {
        let global = &state.global;
        // A size of zero means no sampling
        let sample_size = global.sample_size.filter(|size| *size > 0);
        if let Some(size) = sample_size
            && global.sample_seed.is_none()
        {
            return Err(InvariantViolation::SampleWithoutSeed { size });
        }

        let (Some(view), Some(query)) = (state.viewed_settings(), &state.query) else {
            return Ok(None);
        };

        Ok(Some(Self {
            filter: filter_string(&query.filters),
            first: u64::from(global.page_size) * u64::from(view.page),
            group: view.group_param(),
            number: global.page_size,
            patt: pattern_string(&query.form, main_annotation_id, tagset_main),
            sample: sample_size.filter(|_| global.sample_mode == SampleMode::Percentage),
            samplenum: sample_size.filter(|_| global.sample_mode == SampleMode::Count),
            sampleseed: sample_size.and(global.sample_seed),
            sort: view.sort.clone(),
            viewgroup: view.view_group.clone(),
            wordsaroundhit: global.words_around_hit,
        }))
    }

    /// Name/value pairs in a fixed order, with empty values left out.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let pairs = [
            ("filter", self.filter.clone()),
            ("first", Some(self.first.to_string())),
            ("group", self.group.clone()),
            ("number", Some(self.number.to_string())),
            ("patt", self.patt.clone()),
            ("sample", self.sample.map(|v| v.to_string())),
            ("samplenum", self.samplenum.map(|v| v.to_string())),
            ("sampleseed", self.sampleseed.map(|v| v.to_string())),
            ("sort", self.sort.clone()),
            ("viewgroup", self.viewgroup.clone()),
            ("wordsaroundhit", self.wordsaroundhit.map(|v| v.to_string())),
        ];
        pairs
            .into_iter()
            .filter_map(|(name, value)| value.filter(|v| !v.is_empty()).map(|v| (name, v)))
            .collect()
    }
}
