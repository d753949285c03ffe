use serde::{Deserialize, Serialize};

use super::explore::ExploreMode;
use super::pattern::PatternMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Form {
    #[default]
    Search,
    Explore,
}

/// Which result list is open. Encoded as the last path segment of the url.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultsView {
    Hits,
    Docs,
}

impl ResultsView {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hits => "hits",
            Self::Docs => "docs",
        }
    }

    /// Case-insensitive match on a path segment.
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment.to_ascii_lowercase().as_str() {
            "hits" => Some(Self::Hits),
            "docs" => Some(Self::Docs),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceState {
    pub form: Form,
    pub pattern_mode: PatternMode,
    pub explore_mode: ExploreMode,
    pub viewed_results: Option<ResultsView>,
}

/// The `interface` url parameter. Only the mode relevant to `form` is written.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<Form>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_mode: Option<PatternMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explore_mode: Option<ExploreMode>,
}

impl InterfaceDescriptor {
    pub fn from_state(state: &InterfaceState) -> Self {
        Self {
            form: Some(state.form),
            pattern_mode: (state.form == Form::Search).then_some(state.pattern_mode),
            explore_mode: (state.form == Form::Explore).then_some(state.explore_mode),
        }
    }

    /// Overlay onto fresh defaults; `viewed_results` always comes from the url path.
    pub fn into_state(self, viewed_results: Option<ResultsView>) -> InterfaceState {
        let defaults = InterfaceState::default();
        InterfaceState {
            form: self.form.unwrap_or(defaults.form),
            pattern_mode: self.pattern_mode.unwrap_or(defaults.pattern_mode),
            explore_mode: self.explore_mode.unwrap_or(defaults.explore_mode),
            viewed_results,
        }
    }
}
