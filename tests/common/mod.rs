//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use corpus_query_state::models::{
    Annotation, CorpusSchema, FilterMap, FilterUiType, FilterValue, InterfaceState, MetadataField,
    QueryForm, ResultsView, SearchState, SubmittedQuery,
};
use tempfile::TempDir;

pub const BASE_URL: &str = "http://localhost/corpus-frontend/zeeland/search";

/// Builder for corpus schemas
pub struct SchemaBuilder {
    schema: CorpusSchema,
}

impl SchemaBuilder {
    /// Corpus `zeeland` with a main `word` annotation
    pub fn new() -> Self {
        let mut builder = Self {
            schema: CorpusSchema {
                id: "zeeland".to_string(),
                time_modified: "2024-03-01 12:00:00".to_string(),
                document_count: 120,
                token_count: 45_000,
                annotations: Vec::new(),
                metadata_fields: BTreeMap::new(),
            },
        };
        builder.schema.annotations.push(annotation("word", true, "text"));
        builder
    }

    pub fn with_annotation(mut self, id: &str, ui_type: &str) -> Self {
        self.schema.annotations.push(annotation(id, false, ui_type));
        self
    }

    pub fn with_metadata(mut self, id: &str, ui_type: &str) -> Self {
        self.schema.metadata_fields.insert(
            id.to_string(),
            MetadataField {
                id: id.to_string(),
                display_name: id.to_string(),
                ui_type: ui_type.to_string(),
            },
        );
        self
    }

    pub fn time_modified(mut self, value: &str) -> Self {
        self.schema.time_modified = value.to_string();
        self
    }

    pub fn build(self) -> CorpusSchema {
        self.schema
    }
}

fn annotation(id: &str, main: bool, ui_type: &str) -> Annotation {
    Annotation {
        id: id.to_string(),
        annotated_field_id: "contents".to_string(),
        display_name: id.to_string(),
        is_main_annotation: main,
        is_internal: false,
        ui_type: ui_type.to_string(),
    }
}

/// Schema used by most tests: word, lemma and pos annotations, year, author and genre metadata
pub fn standard_schema() -> CorpusSchema {
    SchemaBuilder::new()
        .with_annotation("lemma", "text")
        .with_annotation("pos", "select")
        .with_metadata("year", "range")
        .with_metadata("author", "text")
        .with_metadata("genre", "select")
        .build()
}

pub fn filter(id: &str, ui_type: FilterUiType, values: &[&str]) -> FilterMap {
    let mut filters = FilterMap::new();
    filters.insert(
        id.to_string(),
        FilterValue::new(id, ui_type, values.iter().map(|v| v.to_string()).collect()),
    );
    filters
}

/// State with `form` submitted and the hits view open
pub fn viewing_hits(form: QueryForm, filters: FilterMap) -> SearchState {
    let mut interface = InterfaceState {
        form: form.form(),
        viewed_results: Some(ResultsView::Hits),
        ..Default::default()
    };
    match &form {
        QueryForm::Search(q) => interface.pattern_mode = q.mode(),
        QueryForm::Explore(q) => interface.explore_mode = q.mode(),
    }
    SearchState {
        interface,
        query: Some(SubmittedQuery { filters, form }),
        ..Default::default()
    }
}

/// Temp directory holding a schema file
pub struct Workspace {
    temp_dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn write_json<T: serde::Serialize>(&self, name: &str, value: &T) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let json = serde_json::to_string_pretty(value).expect("Failed to serialize");
        fs::write(&path, json).expect("Failed to write json file");
        path
    }

    pub fn store_dir(&self) -> PathBuf {
        self.temp_dir.path().join("store")
    }
}
