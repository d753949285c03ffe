use serde::{Deserialize, Serialize};

use super::explore::{ExploreMode, ExploreQuery, ExploreState};
use super::filter::FilterMap;
use super::history::HistoryEntry;
use super::interface::{Form, InterfaceDescriptor, InterfaceState, ResultsView};
use super::pattern::{PatternMode, PatternQuery, PatternState};
use super::results::{GlobalSettings, ViewSettings};

/// The form that produced a submitted search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryForm {
    Search(PatternQuery),
    Explore(ExploreQuery),
}

impl QueryForm {
    pub fn form(&self) -> Form {
        match self {
            Self::Search(_) => Form::Search,
            Self::Explore(_) => Form::Explore,
        }
    }

    pub fn sub_form(&self) -> &'static str {
        match self {
            Self::Search(q) => q.mode().as_str(),
            Self::Explore(q) => q.mode().as_str(),
        }
    }

    /// The `interface` url parameter naming this form and its mode.
    pub fn descriptor(&self) -> InterfaceDescriptor {
        match self {
            Self::Search(q) => InterfaceDescriptor {
                form: Some(Form::Search),
                pattern_mode: Some(q.mode()),
                explore_mode: None,
            },
            Self::Explore(q) => InterfaceDescriptor {
                form: Some(Form::Explore),
                pattern_mode: None,
                explore_mode: Some(q.mode()),
            },
        }
    }
}

/// Snapshot taken when a search is submitted; what the results are computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedQuery {
    pub filters: FilterMap,
    pub form: QueryForm,
}

/// Live application state the url is projected from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchState {
    pub interface: InterfaceState,
    pub query: Option<SubmittedQuery>,
    pub global: GlobalSettings,
    pub hits: ViewSettings,
    pub docs: ViewSettings,
}

impl SearchState {
    pub fn viewed_settings(&self) -> Option<&ViewSettings> {
        match self.interface.viewed_results? {
            ResultsView::Hits => Some(&self.hits),
            ResultsView::Docs => Some(&self.docs),
        }
    }

    /// Restore from a history entry, re-submitting the active form when results are open.
    ///
    /// Filters only take part in the search when the active form is not the simple pattern
    /// editor, which has no filter panel.
    pub fn from_entry(entry: &HistoryEntry) -> Self {
        let interface = entry.interface.clone();
        let query = interface.viewed_results.map(|_| {
            let form = match interface.form {
                Form::Search => QueryForm::Search(entry.patterns.query(interface.pattern_mode)),
                Form::Explore => QueryForm::Explore(entry.explore.query(interface.explore_mode)),
            };
            let filters_active =
                !(interface.form == Form::Search && interface.pattern_mode == PatternMode::Simple);
            SubmittedQuery {
                filters: if filters_active { entry.filters.clone() } else { FilterMap::new() },
                form,
            }
        });

        Self {
            interface,
            query,
            global: entry.global.clone(),
            hits: entry.hits.clone(),
            docs: entry.docs.clone(),
        }
    }

    /// Build the history entry for this state. Editors other than the submitted one, and the
    /// view that is not open, are reset to freshly built defaults.
    pub fn to_entry(&self, main_annotation_id: &str, ngram_max_size: usize) -> HistoryEntry {
        let explore_defaults = ExploreState::defaults(main_annotation_id, ngram_max_size);
        let (filters, patterns, explore, form, pattern_mode, explore_mode) = match &self.query {
            Some(SubmittedQuery { filters, form: QueryForm::Search(q) }) => (
                filters.clone(),
                PatternState::from_query(q.clone()),
                explore_defaults,
                Form::Search,
                q.mode(),
                ExploreMode::default(),
            ),
            Some(SubmittedQuery { filters, form: QueryForm::Explore(q) }) => (
                filters.clone(),
                PatternState::default(),
                explore_defaults.with_query(q.clone()),
                Form::Explore,
                PatternMode::default(),
                q.mode(),
            ),
            None => (
                FilterMap::new(),
                PatternState::default(),
                explore_defaults,
                self.interface.form,
                self.interface.pattern_mode,
                self.interface.explore_mode,
            ),
        };

        let viewed = self.interface.viewed_results;
        HistoryEntry {
            filters,
            patterns,
            explore,
            interface: InterfaceState { form, pattern_mode, explore_mode, viewed_results: viewed },
            hits: if viewed == Some(ResultsView::Hits) { self.hits.clone() } else { ViewSettings::default() },
            docs: if viewed == Some(ResultsView::Docs) { self.docs.clone() } else { ViewSettings::default() },
            global: self.global.clone(),
        }
    }
}
