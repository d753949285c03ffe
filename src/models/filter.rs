use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How a metadata filter is edited, which determines how its values are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterUiType {
    Text,
    Combobox,
    Select,
    Range,
    Checkbox,
    Radio,
}

impl FilterUiType {
    /// Parse a uiType declared by the corpus. Returns `None` for types without a rule.
    pub fn from_declared(ui_type: &str) -> Option<Self> {
        match ui_type {
            "text" => Some(Self::Text),
            "combobox" => Some(Self::Combobox),
            "select" => Some(Self::Select),
            "range" => Some(Self::Range),
            "checkbox" => Some(Self::Checkbox),
            "radio" => Some(Self::Radio),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Combobox => "combobox",
            Self::Select => "select",
            Self::Range => "range",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
        }
    }

    /// Types where the user types their own value, which is escaped when serialized.
    pub fn is_free_text(&self) -> bool {
        matches!(self, Self::Text | Self::Combobox)
    }
}

impl fmt::Display for FilterUiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraint on one metadata field.
///
/// For ranges `values` holds `[min, max]`, for free text a single element, for selects the
/// chosen options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterValue {
    pub id: String,
    #[serde(rename = "type")]
    pub ui_type: FilterUiType,
    pub values: Vec<String>,
}

impl FilterValue {
    pub fn new(id: impl Into<String>, ui_type: FilterUiType, values: Vec<String>) -> Self {
        Self { id: id.into(), ui_type, values }
    }

    pub fn is_active(&self) -> bool {
        self.values.iter().any(|v| !v.trim().is_empty())
    }
}

/// Filters keyed by metadata field id. Ordered so serialization is canonical.
pub type FilterMap = BTreeMap<String, FilterValue>;
