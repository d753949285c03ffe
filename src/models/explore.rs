use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExploreMode {
    Frequency,
    #[default]
    Ngram,
}

impl ExploreMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frequency => "frequency",
            Self::Ngram => "ngram",
        }
    }
}

/// Word list: every hit grouped by one annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyState {
    pub annotation_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgramToken {
    pub id: String,
    /// Glob pattern, empty matches any token
    pub value: String,
}

/// N-gram search: `size` simple tokens grouped by one annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NgramState {
    pub group_annotation_id: String,
    pub tokens: Vec<NgramToken>,
    pub size: usize,
    pub max_size: usize,
}

impl NgramState {
    /// `max_size` empty tokens on `annotation_id`.
    pub fn empty(annotation_id: &str, max_size: usize) -> Self {
        Self {
            group_annotation_id: annotation_id.to_string(),
            tokens: (0..max_size)
                .map(|_| NgramToken { id: annotation_id.to_string(), value: String::new() })
                .collect(),
            size: max_size,
            max_size,
        }
    }

    /// The tokens that take part in the search.
    pub fn active_tokens(&self) -> &[NgramToken] {
        &self.tokens[..self.size.min(self.tokens.len())]
    }
}

/// Contents of both explore editors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExploreState {
    pub frequency: FrequencyState,
    pub ngram: NgramState,
}

impl ExploreState {
    /// Freshly built defaults on the corpus' main annotation.
    pub fn defaults(main_annotation_id: &str, ngram_max_size: usize) -> Self {
        Self {
            frequency: FrequencyState { annotation_id: main_annotation_id.to_string() },
            ngram: NgramState::empty(main_annotation_id, ngram_max_size),
        }
    }

    pub fn query(&self, mode: ExploreMode) -> ExploreQuery {
        match mode {
            ExploreMode::Frequency => ExploreQuery::Frequency(self.frequency.clone()),
            ExploreMode::Ngram => ExploreQuery::Ngram(self.ngram.clone()),
        }
    }

    pub fn with_query(mut self, query: ExploreQuery) -> Self {
        match query {
            ExploreQuery::Frequency(v) => self.frequency = v,
            ExploreQuery::Ngram(v) => self.ngram = v,
        }
        self
    }
}

/// The authoritative explore form of a submitted search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "state", rename_all = "lowercase")]
pub enum ExploreQuery {
    Frequency(FrequencyState),
    Ngram(NgramState),
}

impl ExploreQuery {
    pub fn mode(&self) -> ExploreMode {
        match self {
            Self::Frequency(_) => ExploreMode::Frequency,
            Self::Ngram(_) => ExploreMode::Ngram,
        }
    }

    /// The `hit:` group the explore form aggregates on.
    pub fn group_by(&self) -> String {
        match self {
            Self::Frequency(f) => format!("hit:{}", f.annotation_id),
            Self::Ngram(n) => format!("hit:{}", n.group_annotation_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sized() {
        let state = ExploreState::defaults("word", 5);
        assert_eq!(state.ngram.tokens.len(), 5);
        assert_eq!(state.ngram.size, 5);
        assert!(state.ngram.tokens.iter().all(|t| t.id == "word" && t.value.is_empty()));
        assert_eq!(state.frequency.annotation_id, "word");
    }

    #[test]
    fn test_active_tokens_clamped() {
        let mut ngram = NgramState::empty("lemma", 3);
        ngram.size = 10;
        assert_eq!(ngram.active_tokens().len(), 3);
        ngram.size = 1;
        assert_eq!(ngram.active_tokens().len(), 1);
    }

    #[test]
    fn test_group_by() {
        let query = ExploreQuery::Frequency(FrequencyState { annotation_id: "pos".to_string() });
        assert_eq!(query.group_by(), "hit:pos");
        assert_eq!(query.mode(), ExploreMode::Frequency);
    }
}
