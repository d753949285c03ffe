//! Keeping the browser url and the history log in step with the query state.

use tracing::{debug, info};
use url::Url;

use super::builder::{EncodedUrl, Encoder};
use super::params::SearchParams;
use crate::decode::Classifier;
use crate::error::InvariantViolation;
use crate::history::{DisplayValues, HistoryLog, LoggedQuery};
use crate::models::{HistoryEntry, QueryForm, ResultsView, SearchState};

/// Browser navigation: the current url, the entry attached to it, and pushing new ones.
pub trait Navigator {
    fn current_url(&self) -> Url;
    fn current_state(&self) -> Option<HistoryEntry>;
    fn push_state(&mut self, entry: HistoryEntry, url: Url);
}

/// In-process navigation stack.
#[derive(Debug, Clone)]
pub struct MemoryNavigator {
    stack: Vec<(Url, Option<HistoryEntry>)>,
    position: usize,
}

impl MemoryNavigator {
    /// Stack holding only `url`, as after landing on a page.
    pub fn new(url: Url) -> Self {
        Self { stack: vec![(url, None)], position: 0 }
    }

    /// Step back, returning the url and attached entry that are now current.
    pub fn back(&mut self) -> Option<(Url, Option<HistoryEntry>)> {
        self.position = self.position.checked_sub(1)?;
        self.stack.get(self.position).cloned()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

impl Navigator for MemoryNavigator {
    fn current_url(&self) -> Url {
        self.stack[self.position].0.clone()
    }

    fn current_state(&self) -> Option<HistoryEntry> {
        self.stack[self.position].1.clone()
    }

    fn push_state(&mut self, entry: HistoryEntry, url: Url) {
        self.stack.truncate(self.position + 1);
        self.stack.push((url, Some(entry)));
        self.position = self.stack.len() - 1;
    }
}

/// What [`UrlSync::publish`] did with a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Same parameters, results view and form as the previous state
    Unchanged,
    /// The url is already current
    SameUrl,
    /// The truncated url is current and the pattern did not change
    SamePattern,
    Pushed { url: Url, is_truncated: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    params: Option<SearchParams>,
    viewed_results: Option<ResultsView>,
    sub_form: Option<&'static str>,
}

pub struct UrlSync<N: Navigator> {
    navigator: N,
    encoder: Encoder,
    classifier: Classifier,
    history: HistoryLog,
    last: Option<Snapshot>,
}

impl<N: Navigator> UrlSync<N> {
    pub fn new(navigator: N, encoder: Encoder, classifier: Classifier, history: HistoryLog) -> Self {
        Self { navigator, encoder, classifier, history, last: None }
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut N {
        &mut self.navigator
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryLog {
        &mut self.history
    }

    /// Project `state` onto the url, pushing a navigation entry and logging the query when it
    /// differs from what is current.
    pub fn publish(&mut self, state: &SearchState) -> Result<SyncOutcome, InvariantViolation> {
        let current = self.navigator.current_url();
        let encoded = self.encoder.encode(state, &current)?;

        let snapshot = Snapshot {
            params: encoded.params.clone(),
            viewed_results: state.interface.viewed_results,
            sub_form: state.query.as_ref().map(|q| q.form.sub_form()),
        };
        if self.last.as_ref() == Some(&snapshot) {
            return Ok(SyncOutcome::Unchanged);
        }
        self.last = Some(snapshot);

        if normalize(current.as_str()) == normalize(encoded.url.as_str()) {
            if !encoded.is_truncated {
                debug!(url = %encoded.url, "url unchanged, not pushing");
                return Ok(SyncOutcome::SameUrl);
            }
            // The url cannot tell truncated queries apart, compare with the attached entry
            let Some(last_entry) = self.navigator.current_state() else {
                return Ok(SyncOutcome::SameUrl);
            };
            if state.query.as_ref().is_none_or(|q| same_form(&q.form, &last_entry)) {
                debug!(url = %encoded.url, "truncated url unchanged and pattern equal, not pushing");
                return Ok(SyncOutcome::SamePattern);
            }
        }

        Ok(self.push(encoded))
    }

    fn push(&mut self, encoded: EncodedUrl) -> SyncOutcome {
        let EncodedUrl { url, is_truncated, entry, params } = encoded;
        let display_values = DisplayValues {
            filters: params.as_ref().and_then(|p| p.filter.clone()).unwrap_or_default(),
            pattern: params.as_ref().and_then(|p| p.patt.clone()).unwrap_or_default(),
        };

        info!(%url, is_truncated, "adding query to history");
        self.history.add_entry(LoggedQuery::new(entry.clone(), url.as_str(), display_values));
        self.navigator.push_state(entry, url.clone());
        SyncOutcome::Pushed { url, is_truncated }
    }

    /// State to restore after back/forward navigation. An attached entry is used as is,
    /// otherwise the url is decoded.
    pub fn on_pop_state(
        &self,
        attached: Option<HistoryEntry>,
        url: &Url,
    ) -> Result<HistoryEntry, InvariantViolation> {
        match attached {
            Some(entry) => Ok(entry),
            None => Ok(self.classifier.decode_url(url)?.entry),
        }
    }
}

fn normalize(url: &str) -> &str {
    url.trim_end_matches('/')
}

fn same_form(form: &QueryForm, entry: &HistoryEntry) -> bool {
    match form {
        QueryForm::Search(query) => *query == entry.patterns.query(entry.interface.pattern_mode),
        QueryForm::Explore(query) => *query == entry.explore.query(entry.interface.explore_mode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, HistorySettings, UrlSettings};
    use crate::models::{CorpusSchema, FilterMap, InterfaceState, PatternQuery, SubmittedQuery};

    fn schema() -> CorpusSchema {
        serde_json::from_str(
            r#"{"id":"test","timeModified":"t","annotations":[{"id":"word","isMainAnnotation":true}]}"#,
        )
        .unwrap()
    }

    fn sync(config: Config) -> UrlSync<MemoryNavigator> {
        let start = Url::parse("http://localhost/cf/test/search/").unwrap();
        UrlSync::new(
            MemoryNavigator::new(start),
            Encoder::new(schema(), config.clone()),
            Classifier::new(schema(), config),
            HistoryLog::new(&schema(), &HistorySettings::default(), None),
        )
    }

    fn searching(pattern: &str) -> SearchState {
        SearchState {
            interface: InterfaceState {
                viewed_results: Some(ResultsView::Hits),
                ..Default::default()
            },
            query: Some(SubmittedQuery {
                filters: FilterMap::new(),
                form: QueryForm::Search(PatternQuery::Simple(Some(pattern.to_string()))),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_publish_pushes_and_logs() {
        let mut sync = sync(Config::default());
        let outcome = sync.publish(&searching("cat")).unwrap();
        assert!(matches!(outcome, SyncOutcome::Pushed { is_truncated: false, .. }));
        assert_eq!(sync.navigator().len(), 2);
        assert_eq!(sync.history().len(), 1);
        assert_eq!(sync.history().entries()[0].display_values.pattern, r#"[word="cat"]"#);
    }

    #[test]
    fn test_publish_same_state_twice_is_unchanged() {
        let mut sync = sync(Config::default());
        sync.publish(&searching("cat")).unwrap();
        assert_eq!(sync.publish(&searching("cat")).unwrap(), SyncOutcome::Unchanged);
        assert_eq!(sync.navigator().len(), 2);
    }

    #[test]
    fn test_idle_state_on_search_page_is_same_url() {
        let mut sync = sync(Config::default());
        assert_eq!(sync.publish(&SearchState::default()).unwrap(), SyncOutcome::SameUrl);
        assert_eq!(sync.navigator().len(), 1);
        assert!(sync.history().is_empty());
    }

    #[test]
    fn test_truncated_url_compares_patterns() {
        let config = Config { url: UrlSettings { max_length: 150 }, ..Default::default() };
        let mut sync = sync(config);
        let first = searching(&"a ".repeat(40));
        assert!(matches!(
            sync.publish(&first).unwrap(),
            SyncOutcome::Pushed { is_truncated: true, .. }
        ));

        // Different pattern, same truncated url
        let second = searching(&"b ".repeat(40));
        assert!(matches!(sync.publish(&second).unwrap(), SyncOutcome::Pushed { .. }));
        assert_eq!(sync.navigator().len(), 3);
    }

    #[test]
    fn test_pop_state_prefers_attached_entry() {
        let mut sync = sync(Config::default());
        sync.publish(&searching("cat")).unwrap();
        sync.publish(&searching("dog")).unwrap();

        let (url, attached) = sync.navigator_mut().back().unwrap();
        let restored = sync.on_pop_state(attached, &url).unwrap();
        assert_eq!(restored.patterns.simple.as_deref(), Some("cat"));

        let decoded = sync.on_pop_state(None, &url).unwrap();
        assert_eq!(decoded.patterns.simple.as_deref(), Some("cat"));
    }
}
