use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Annotation searched by bare `"value"` tokens when the corpus declares none.
pub const FALLBACK_MAIN_ANNOTATION: &str = "word";

const POS_UI_TYPE: &str = "pos";

/// Per-token attribute of an annotated field, e.g. `lemma` in `contents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: String,
    #[serde(default = "default_annotated_field")]
    pub annotated_field_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub is_main_annotation: bool,
    #[serde(default)]
    pub is_internal: bool,
    #[serde(default = "default_annotation_ui_type")]
    pub ui_type: String,
}

/// Per-document attribute usable in filters.
///
/// `ui_type` is kept as declared by the corpus; the filter decoder rejects types it does not know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataField {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    pub ui_type: String,
}

/// Read-only description of a corpus: its annotations, metadata fields and totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusSchema {
    pub id: String,
    /// `yyyy-mm-dd hh:mm:ss`, changes whenever the index is rebuilt
    pub time_modified: String,
    #[serde(default)]
    pub document_count: u64,
    #[serde(default)]
    pub token_count: u64,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub metadata_fields: BTreeMap<String, MetadataField>,
}

impl CorpusSchema {
    pub fn annotation(&self, id: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    /// Whether `id` names any annotation, internal ones included.
    pub fn has_annotation(&self, id: &str) -> bool {
        self.annotation(id).is_some()
    }

    /// First non-internal annotation flagged as main.
    pub fn main_annotation(&self) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.is_main_annotation && !a.is_internal)
    }

    pub fn main_annotation_id(&self) -> &str {
        self.main_annotation().map(|a| a.id.as_str()).unwrap_or(FALLBACK_MAIN_ANNOTATION)
    }

    pub fn metadata_field(&self, id: &str) -> Option<&MetadataField> {
        self.metadata_fields.get(id)
    }

    /// Tagset editing is only offered for corpora with a part-of-speech annotation.
    pub fn has_pos_annotation(&self) -> bool {
        self.annotations.iter().any(|a| !a.is_internal && a.ui_type == POS_UI_TYPE)
    }
}

fn default_annotated_field() -> String {
    "contents".to_string()
}

fn default_annotation_ui_type() -> String {
    "text".to_string()
}
