use serde::{Deserialize, Serialize};

/// Page sizes the result views offer.
pub const PAGE_SIZES: [u32; 4] = [20, 50, 100, 200];
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleMode {
    #[default]
    Percentage,
    Count,
}

/// Settings shared by both result views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    pub page_size: u32,
    pub sample_mode: SampleMode,
    pub sample_seed: Option<i64>,
    pub sample_size: Option<u32>,
    pub words_around_hit: Option<u32>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            sample_mode: SampleMode::default(),
            sample_seed: None,
            sample_size: None,
            words_around_hit: None,
        }
    }
}

/// Grouping, sorting and paging of one result view (hits or docs).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSettings {
    /// Simple group ids such as `hit:lemma`, without case flag
    pub group_by: Vec<String>,
    /// `context:` groups, kept verbatim
    pub group_by_advanced: Vec<String>,
    pub case_sensitive: bool,
    pub sort: Option<String>,
    pub view_group: Option<String>,
    pub page: u32,
}

impl ViewSettings {
    /// The `group` parameter: flagged simple groups followed by context groups.
    pub fn group_param(&self) -> Option<String> {
        let flag = if self.case_sensitive { ":s" } else { ":i" };
        let groups: Vec<String> = self
            .group_by
            .iter()
            .map(|g| format!("{g}{flag}"))
            .chain(self.group_by_advanced.iter().cloned())
            .collect();
        (!groups.is_empty()).then(|| groups.join(","))
    }
}
