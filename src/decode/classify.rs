//! Url → query state.
//!
//! Every derived value is computed once, in dependency order, by [`DecodeContext::new`] from an
//! immutable [`UrlParams`] snapshot. The classifier then picks the most constrained editor
//! that can hold the pattern, unless the url carries an explicit `interface` descriptor.

use serde::Serialize;
use tracing::debug;
use url::Url;

use super::attributes::reconstruct;
use super::params::UrlParams;
use crate::config::Config;
use crate::cql::{CqlParser, Expr, ParsedPattern, PatternParser, regex_to_wildcard};
use crate::error::InvariantViolation;
use crate::filters::{FilterParser, LuceneParser, decode_filter_string};
use crate::models::{
    CorpusSchema, ExploreMode, ExploreState, ExtendedPattern, FilterMap, Form, FrequencyState,
    GlobalSettings, HistoryEntry, InterfaceDescriptor, InterfaceState, NgramState, NgramToken,
    PatternMode, PatternState, ResultsView, SampleMode, ViewSettings,
};
use crate::models::results::{DEFAULT_PAGE_SIZE, PAGE_SIZES};

const CONTEXT_GROUP_PREFIX: &str = "context:";
const HIT_GROUP_PREFIX: &str = "hit:";
/// Pattern of the frequency list: every token.
const MATCH_ALL: &str = "[]";
const MAX_WORDS_AROUND_HIT: i64 = 10;
const MAX_SAMPLE_PERCENTAGE: i64 = 100;

/// Result of decoding a url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub form: Form,
    pub pattern_mode: PatternMode,
    /// Set when the explore form is active
    pub explore_mode: Option<ExploreMode>,
    pub entry: HistoryEntry,
}

/// Decodes urls against one corpus.
pub struct Classifier {
    schema: CorpusSchema,
    config: Config,
    pattern_parser: Box<dyn PatternParser>,
    filter_parser: Box<dyn FilterParser>,
}

impl Classifier {
    /// Classifier using the bundled pattern and filter parsers.
    pub fn new(schema: CorpusSchema, config: Config) -> Self {
        Self::with_parsers(schema, config, Box::new(CqlParser), Box::new(LuceneParser))
    }

    pub fn with_parsers(
        schema: CorpusSchema,
        config: Config,
        pattern_parser: Box<dyn PatternParser>,
        filter_parser: Box<dyn FilterParser>,
    ) -> Self {
        Self { schema, config, pattern_parser, filter_parser }
    }

    pub fn schema(&self) -> &CorpusSchema {
        &self.schema
    }

    pub fn decode_url(&self, url: &Url) -> Result<Classification, InvariantViolation> {
        self.classify(&UrlParams::from_url(url))
    }

    pub fn classify(&self, params: &UrlParams) -> Result<Classification, InvariantViolation> {
        Ok(DecodeContext::new(self, params)?.into_classification())
    }
}

/// Classify a url given as path segments and query pairs, with default configuration.
pub fn classify(
    segments: &[String],
    pairs: &[(String, String)],
    schema: &CorpusSchema,
) -> Result<Classification, InvariantViolation> {
    let params = UrlParams::new(segments.to_vec(), pairs.iter().cloned());
    Classifier::new(schema.clone(), Config::default()).classify(&params)
}

struct Groups {
    /// Raw values, flags and context groups intact
    all: Vec<String>,
    simple: Vec<String>,
    advanced: Vec<String>,
    case_sensitive: bool,
}

impl Groups {
    fn parse(raw: Option<&str>) -> Self {
        let all: Vec<String> = raw
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect();
        let (advanced, flagged): (Vec<String>, Vec<String>) =
            all.iter().cloned().partition(|g| g.starts_with(CONTEXT_GROUP_PREFIX));
        let case_sensitive = !flagged.is_empty() && flagged.iter().all(|g| g.ends_with(":s"));
        let simple = flagged
            .into_iter()
            .map(|g| match g.strip_suffix(":s").or_else(|| g.strip_suffix(":i")) {
                Some(stripped) => stripped.to_string(),
                None => g,
            })
            .collect();
        Self { all, simple, advanced, case_sensitive }
    }

    /// The annotation of the only group, if that group is a `hit:` group.
    fn single_hit_annotation(&self) -> Option<&str> {
        match self.simple.as_slice() {
            [group] => group.strip_prefix(HIT_GROUP_PREFIX),
            _ => None,
        }
    }
}

struct DecodeContext<'a> {
    params: &'a UrlParams,
    schema: &'a CorpusSchema,
    ngram_max_size: usize,
    viewed_results: Option<ResultsView>,
    expert: Option<String>,
    parsed: Option<ParsedPattern>,
    filters: FilterMap,
    groups: Groups,
    global: GlobalSettings,
    extended: ExtendedPattern,
    simple: Option<String>,
    advanced: Option<String>,
    frequency: Option<FrequencyState>,
    ngram: Option<NgramState>,
}

impl<'a> DecodeContext<'a> {
    fn new(classifier: &'a Classifier, params: &'a UrlParams) -> Result<Self, InvariantViolation> {
        let schema = &classifier.schema;
        let main_annotation = schema.main_annotation_id();

        let expert = params.get_string("patt").filter(|v| !v.is_empty()).map(str::to_string);
        let parsed = expert.as_deref().and_then(|patt| {
            match classifier.pattern_parser.parse_pattern(patt, main_annotation) {
                Ok(parsed) if !parsed.tokens.is_empty() => Some(parsed),
                Ok(_) => None,
                Err(err) => {
                    debug!(pattern = patt, error = %err, "pattern cannot be parsed");
                    None
                }
            }
        });

        let filters = decode_filter_string(
            params.get_string("filter"),
            classifier.filter_parser.as_ref(),
            schema,
        )?;

        let annotation_values = match &parsed {
            Some(parsed) => {
                match reconstruct(&parsed.tokens, schema, classifier.config.tagset.as_ref()) {
                    Ok(values) => values,
                    Err(err) => {
                        debug!(error = %err, "pattern does not fit the extended editor");
                        Default::default()
                    }
                }
            }
            None => Default::default(),
        };
        let extended = ExtendedPattern {
            annotation_values,
            within: parsed.as_ref().and_then(|p| p.within.clone()),
        };

        let simple = match extended.annotation_values.values().collect::<Vec<_>>().as_slice() {
            [only] if extended.within.is_none()
                && only.id == main_annotation
                && !only.case_sensitive =>
            {
                Some(only.value.clone())
            }
            _ => None,
        };
        let advanced = parsed.as_ref().and(expert.clone());

        let mut context = Self {
            params,
            schema,
            ngram_max_size: classifier.config.explore.ngram_max_size,
            viewed_results: params.viewed_results(),
            expert,
            parsed,
            filters,
            groups: Groups::parse(params.get_string("group")),
            global: global_settings(params),
            extended,
            simple,
            advanced,
            frequency: None,
            ngram: None,
        };
        context.frequency = context.frequency();
        context.ngram = context.ngram();
        Ok(context)
    }

    fn known_annotation(&self, id: &str) -> bool {
        self.schema.has_annotation(id)
    }

    fn frequency(&self) -> Option<FrequencyState> {
        if self.expert.as_deref() != Some(MATCH_ALL) || self.groups.all.len() != 1 {
            return None;
        }
        let annotation_id = self.groups.single_hit_annotation()?;
        self.known_annotation(annotation_id)
            .then(|| FrequencyState { annotation_id: annotation_id.to_string() })
    }

    fn ngram(&self) -> Option<NgramState> {
        if !self.groups.advanced.is_empty() {
            return None;
        }
        let group_annotation_id = self.groups.single_hit_annotation()?;
        if !self.known_annotation(group_annotation_id) {
            return None;
        }
        let parsed = self.parsed.as_ref()?;
        if parsed.within.is_some()
            || parsed.tokens.len() > self.ngram_max_size
            || !parsed.tokens.iter().all(|t| t.is_single_equality())
        {
            return None;
        }

        let main_annotation = self.schema.main_annotation_id();
        let mut tokens: Vec<NgramToken> = parsed
            .tokens
            .iter()
            .map(|t| match &t.expression {
                Some(Expr::Attribute(a)) => {
                    NgramToken { id: a.name.clone(), value: regex_to_wildcard(&a.value) }
                }
                _ => NgramToken { id: main_annotation.to_string(), value: String::new() },
            })
            .collect();
        let size = tokens.len();
        tokens.resize_with(self.ngram_max_size, || NgramToken {
            id: main_annotation.to_string(),
            value: String::new(),
        });

        Some(NgramState {
            group_annotation_id: group_annotation_id.to_string(),
            tokens,
            size,
            max_size: self.ngram_max_size,
        })
    }

    fn interface(&self) -> InterfaceState {
        let descriptor = self
            .params
            .get_string("interface")
            .filter(|v| v.starts_with('{'))
            .and_then(|v| serde_json::from_str::<InterfaceDescriptor>(v).ok());
        if let Some(descriptor) = descriptor {
            return descriptor.into_state(self.viewed_results);
        }

        let has_filters = !self.filters.is_empty();
        let mut from_pattern = true;
        let pattern_mode = if self.simple.is_some() && !has_filters {
            PatternMode::Simple
        } else if !self.extended.annotation_values.is_empty() {
            PatternMode::Extended
        } else if self.advanced.is_some() {
            PatternMode::Advanced
        } else if self.expert.is_some() {
            PatternMode::Expert
        } else {
            from_pattern = false;
            if has_filters { PatternMode::Extended } else { PatternMode::Simple }
        };

        let (form, explore_mode) = if self.frequency.is_some() {
            (Form::Explore, ExploreMode::Frequency)
        } else if self.ngram.is_some() && !(from_pattern && pattern_mode == PatternMode::Simple) {
            (Form::Explore, ExploreMode::Ngram)
        } else {
            (Form::Search, ExploreMode::default())
        };

        InterfaceState { form, pattern_mode, explore_mode, viewed_results: self.viewed_results }
    }

    fn view(&self, view: ResultsView) -> ViewSettings {
        if self.viewed_results != Some(view) {
            return ViewSettings::default();
        }
        let page_size = i64::from(self.global.page_size);
        let page = self
            .params
            .get_number("first")
            .map(|first| u32::try_from(first.max(0) / page_size).unwrap_or(u32::MAX))
            .unwrap_or(0);

        ViewSettings {
            group_by: self.groups.simple.clone(),
            group_by_advanced: self.groups.advanced.clone(),
            case_sensitive: self.groups.case_sensitive,
            sort: self.params.get_string("sort").filter(|v| !v.is_empty()).map(str::to_string),
            view_group: self
                .params
                .get_string("viewgroup")
                .filter(|v| !v.is_empty() && !self.groups.all.is_empty())
                .map(str::to_string),
            page,
        }
    }

    fn into_classification(self) -> Classification {
        let interface = self.interface();
        let main_annotation = self.schema.main_annotation_id();
        let defaults = ExploreState::defaults(main_annotation, self.ngram_max_size);
        let hits = self.view(ResultsView::Hits);
        let docs = self.view(ResultsView::Docs);

        let entry = HistoryEntry {
            explore: ExploreState {
                frequency: self.frequency.unwrap_or(defaults.frequency),
                ngram: self.ngram.unwrap_or(defaults.ngram),
            },
            patterns: PatternState {
                simple: self.simple,
                extended: self.extended,
                advanced: self.advanced,
                expert: self.expert,
            },
            filters: self.filters,
            interface: interface.clone(),
            hits,
            docs,
            global: self.global,
        };

        Classification {
            form: interface.form,
            pattern_mode: interface.pattern_mode,
            explore_mode: (interface.form == Form::Explore).then_some(interface.explore_mode),
            entry,
        }
    }
}

fn global_settings(params: &UrlParams) -> GlobalSettings {
    let page_size = params
        .get_number("number")
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| PAGE_SIZES.contains(n))
        .unwrap_or(DEFAULT_PAGE_SIZE);

    let percentage = params
        .get_number("sample")
        .filter(|v| (0..=MAX_SAMPLE_PERCENTAGE).contains(v))
        .and_then(|v| u32::try_from(v).ok());
    let count = params.get_number("samplenum").and_then(|v| u32::try_from(v).ok());
    let (sample_mode, sample_size) = match (percentage, count) {
        (Some(size), _) => (SampleMode::Percentage, Some(size)),
        (None, Some(size)) => (SampleMode::Count, Some(size)),
        (None, None) => (SampleMode::default(), None),
    };

    GlobalSettings {
        page_size,
        sample_mode,
        sample_seed: params.get_number("sampleseed"),
        sample_size,
        words_around_hit: params
            .get_number("wordsaroundhit")
            .filter(|v| (0..=MAX_WORDS_AROUND_HIT).contains(v))
            .and_then(|v| u32::try_from(v).ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Annotation, MetadataField};

    fn schema() -> CorpusSchema {
        let annotation = |id: &str, main: bool| Annotation {
            id: id.to_string(),
            annotated_field_id: "contents".to_string(),
            display_name: id.to_string(),
            is_main_annotation: main,
            is_internal: false,
            ui_type: "text".to_string(),
        };
        CorpusSchema {
            id: "test".to_string(),
            time_modified: "2024-01-01 00:00:00".to_string(),
            document_count: 10,
            token_count: 1000,
            annotations: vec![annotation("word", true), annotation("lemma", false), annotation("pos", false)],
            metadata_fields: [(
                "year".to_string(),
                MetadataField {
                    id: "year".to_string(),
                    display_name: "Year".to_string(),
                    ui_type: "range".to_string(),
                },
            )]
            .into_iter()
            .collect(),
        }
    }

    fn decode(url: &str) -> Classification {
        Classifier::new(schema(), Config::default()).decode_url(&Url::parse(url).unwrap()).unwrap()
    }

    const BASE: &str = "http://localhost/corpus-frontend/test/search";

    #[test]
    fn test_groups_parse() {
        let groups = Groups::parse(Some(" hit:lemma:s, field:year:s ,, context:word:i:L1-1"));
        assert_eq!(groups.all.len(), 3);
        assert_eq!(groups.simple, vec!["hit:lemma", "field:year"]);
        assert_eq!(groups.advanced, vec!["context:word:i:L1-1"]);
        assert!(groups.case_sensitive);

        let mixed = Groups::parse(Some("hit:lemma:s,hit:word:i"));
        assert!(!mixed.case_sensitive);
        assert!(!Groups::parse(None).case_sensitive);
    }

    #[test]
    fn test_simple_pattern_with_page() {
        let result = decode(&format!("{BASE}/hits?patt=%22cat%22&first=40&number=20"));
        assert_eq!(result.form, Form::Search);
        assert_eq!(result.pattern_mode, PatternMode::Simple);
        assert_eq!(result.entry.patterns.simple.as_deref(), Some("cat"));
        assert_eq!(result.entry.hits.page, 2);
        assert_eq!(result.entry.docs, ViewSettings::default());
    }

    #[test]
    fn test_two_annotations_are_extended() {
        let result = decode(&format!("{BASE}/hits?patt=%5Blemma%3D%22a%22%20%26%20pos%3D%22N%22%5D"));
        assert_eq!(result.pattern_mode, PatternMode::Extended);
        assert!(result.entry.patterns.simple.is_none());
        assert_eq!(result.entry.patterns.extended.annotation_values.len(), 2);
    }

    #[test]
    fn test_filters_push_simple_to_extended() {
        let result = decode(&format!("{BASE}/docs?patt=%22cat%22&filter=year%3A%5B2000%20TO%202010%5D"));
        assert_eq!(result.pattern_mode, PatternMode::Extended);
        assert_eq!(result.entry.filters["year"].values, vec!["2000", "2010"]);
    }

    #[test]
    fn test_unreconstructable_pattern_is_advanced() {
        let result = decode(&format!("{BASE}/hits?patt=%22a%22%2B"));
        assert_eq!(result.pattern_mode, PatternMode::Advanced);
        assert_eq!(result.entry.patterns.advanced.as_deref(), Some("\"a\"+"));
    }

    #[test]
    fn test_unparsable_pattern_is_expert() {
        let result = decode(&format!("{BASE}/hits?patt=%5Bword%3D"));
        assert_eq!(result.pattern_mode, PatternMode::Expert);
        assert!(result.entry.patterns.advanced.is_none());
        assert_eq!(result.entry.patterns.expert.as_deref(), Some("[word="));
    }

    #[test]
    fn test_fallback_modes() {
        assert_eq!(decode(BASE).pattern_mode, PatternMode::Simple);
        let filtered = decode(&format!("{BASE}/docs?filter=year%3A%5B1%20TO%202%5D"));
        assert_eq!(filtered.pattern_mode, PatternMode::Extended);
    }

    #[test]
    fn test_frequency() {
        let result = decode(&format!("{BASE}/hits?patt=%5B%5D&group=hit%3Alemma%3Ai"));
        assert_eq!(result.form, Form::Explore);
        assert_eq!(result.explore_mode, Some(ExploreMode::Frequency));
        assert_eq!(result.entry.explore.frequency.annotation_id, "lemma");
    }

    #[test]
    fn test_ngram() {
        let result = decode(&format!(
            "{BASE}/hits?patt=%5Blemma%3D%22a.*%22%5D%20%5B%5D&group=hit%3Aword%3Ai"
        ));
        assert_eq!(result.explore_mode, Some(ExploreMode::Ngram));
        let ngram = &result.entry.explore.ngram;
        assert_eq!(ngram.size, 2);
        assert_eq!(ngram.tokens.len(), 5);
        assert_eq!(ngram.tokens[0], NgramToken { id: "lemma".to_string(), value: "a*".to_string() });
        assert_eq!(ngram.tokens[1].value, "");
    }

    #[test]
    fn test_simple_pattern_suppresses_ngram() {
        let result = decode(&format!("{BASE}/hits?patt=%22cat%22&group=hit%3Aword%3Ai"));
        assert_eq!(result.form, Form::Search);
        assert_eq!(result.pattern_mode, PatternMode::Simple);
        assert!(result.explore_mode.is_none());
    }

    #[test]
    fn test_unknown_group_annotation_is_not_explore() {
        let result = decode(&format!("{BASE}/hits?patt=%5B%5D&group=hit%3Acolor%3Ai"));
        assert_eq!(result.form, Form::Search);
    }

    #[test]
    fn test_interface_descriptor_is_trusted() {
        let interface = "%7B%22form%22%3A%22search%22%2C%22patternMode%22%3A%22expert%22%7D";
        let result = decode(&format!("{BASE}/hits?patt=%22cat%22&interface={interface}"));
        assert_eq!(result.pattern_mode, PatternMode::Expert);
        assert_eq!(result.entry.interface.viewed_results, Some(ResultsView::Hits));
        // Editors are still filled in
        assert_eq!(result.entry.patterns.simple.as_deref(), Some("cat"));
    }

    #[test]
    fn test_malformed_interface_falls_back() {
        let result = decode(&format!("{BASE}/hits?patt=%22cat%22&interface=%7Bbroken"));
        assert_eq!(result.pattern_mode, PatternMode::Simple);
    }

    #[test]
    fn test_global_settings() {
        let result = decode(&format!(
            "{BASE}/hits?number=50&sample=10&samplenum=99&sampleseed=7&wordsaroundhit=11"
        ));
        let global = &result.entry.global;
        assert_eq!(global.page_size, 50);
        assert_eq!(global.sample_mode, SampleMode::Percentage);
        assert_eq!(global.sample_size, Some(10));
        assert_eq!(global.sample_seed, Some(7));
        assert_eq!(global.words_around_hit, None);

        let count = decode(&format!("{BASE}/hits?number=33&sample=101&samplenum=99"));
        assert_eq!(count.entry.global.page_size, 20);
        assert_eq!(count.entry.global.sample_mode, SampleMode::Count);
        assert_eq!(count.entry.global.sample_size, Some(99));
    }

    #[test]
    fn test_viewgroup_requires_groups() {
        let without = decode(&format!("{BASE}/hits?viewgroup=x&sort=-size"));
        assert_eq!(without.entry.hits.view_group, None);
        assert_eq!(without.entry.hits.sort.as_deref(), Some("-size"));
        let with = decode(&format!("{BASE}/hits?viewgroup=x&group=hit%3Aword%3Ai"));
        assert_eq!(with.entry.hits.view_group.as_deref(), Some("x"));
    }

    #[test]
    fn test_unsupported_filter_type_is_fatal() {
        let mut schema = schema();
        schema.metadata_fields.get_mut("year").unwrap().ui_type = "slider".to_string();
        let params = UrlParams::new(
            vec!["docs".to_string()],
            [("filter".to_string(), "year:[1 TO 2]".to_string())],
        );
        let result = Classifier::new(schema, Config::default()).classify(&params);
        assert!(matches!(result, Err(InvariantViolation::UnsupportedUiType { .. })));
    }

    #[test]
    fn test_free_classify_function() {
        let result = classify(
            &["test".to_string(), "search".to_string(), "hits".to_string()],
            &[("patt".to_string(), "\"dog\"".to_string())],
            &schema(),
        )
        .unwrap();
        assert_eq!(result.pattern_mode, PatternMode::Simple);
        assert_eq!(result.entry.interface.viewed_results, Some(ResultsView::Hits));
    }
}
