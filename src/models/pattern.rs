use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The pattern editors, from most to least constrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternMode {
    #[default]
    Simple,
    Extended,
    Advanced,
    Expert,
}

impl PatternMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Extended => "extended",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }
}

/// Value entered for one annotation in the extended editor.
///
/// `value` is a whitespace-separated list of glob patterns, one per token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationValue {
    pub id: String,
    pub value: String,
    #[serde(rename = "case")]
    pub case_sensitive: bool,
}

impl AnnotationValue {
    pub fn new(id: impl Into<String>, value: impl Into<String>, case_sensitive: bool) -> Self {
        Self { id: id.into(), value: value.into(), case_sensitive }
    }
}

pub type AnnotationValues = BTreeMap<String, AnnotationValue>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedPattern {
    pub annotation_values: AnnotationValues,
    /// Name of the enclosing span tag, e.g. `s` for `within <s/>`
    pub within: Option<String>,
}

/// Contents of every pattern editor. Only the one selected by the interface is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PatternState {
    pub simple: Option<String>,
    pub extended: ExtendedPattern,
    pub advanced: Option<String>,
    pub expert: Option<String>,
}

impl PatternState {
    pub fn query(&self, mode: PatternMode) -> PatternQuery {
        match mode {
            PatternMode::Simple => PatternQuery::Simple(self.simple.clone()),
            PatternMode::Extended => PatternQuery::Extended(self.extended.clone()),
            PatternMode::Advanced => PatternQuery::Advanced(self.advanced.clone()),
            PatternMode::Expert => PatternQuery::Expert(self.expert.clone()),
        }
    }

    /// Fresh editor state holding only `query`.
    pub fn from_query(query: PatternQuery) -> Self {
        let mut state = Self::default();
        match query {
            PatternQuery::Simple(v) => state.simple = v,
            PatternQuery::Extended(v) => state.extended = v,
            PatternQuery::Advanced(v) => state.advanced = v,
            PatternQuery::Expert(v) => state.expert = v,
        }
        state
    }
}

/// The authoritative pattern of a submitted search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "state", rename_all = "lowercase")]
pub enum PatternQuery {
    Simple(Option<String>),
    Extended(ExtendedPattern),
    Advanced(Option<String>),
    Expert(Option<String>),
}

impl PatternQuery {
    pub fn mode(&self) -> PatternMode {
        match self {
            Self::Simple(_) => PatternMode::Simple,
            Self::Extended(_) => PatternMode::Extended,
            Self::Advanced(_) => PatternMode::Advanced,
            Self::Expert(_) => PatternMode::Expert,
        }
    }
}
