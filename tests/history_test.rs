/// History log persistence through the file store
mod common;

use std::sync::Arc;

use common::{BASE_URL, SchemaBuilder, Workspace, standard_schema, viewing_hits};
use corpus_query_state::config::{Config, HistorySettings};
use corpus_query_state::encode::{Encoder, MemoryNavigator, SyncOutcome, UrlSync};
use corpus_query_state::history::{
    DisplayValues, FileStore, HISTORY_VERSION, HistoryLog, KeyValueStore, LoggedQuery,
    PersistedHistory,
};
use corpus_query_state::models::{FilterMap, PatternQuery, QueryForm, SearchState};
use corpus_query_state::Classifier;
use url::Url;

fn logged(pattern: &str) -> LoggedQuery {
    let state = viewing_hits(
        QueryForm::Search(PatternQuery::Simple(Some(pattern.to_string()))),
        FilterMap::new(),
    );
    let entry = state.to_entry("word", 5);
    LoggedQuery::new(entry, format!("{BASE_URL}/hits?patt={pattern}"), DisplayValues::default())
}

fn file_store(workspace: &Workspace) -> Arc<dyn KeyValueStore> {
    Arc::new(FileStore::new(workspace.store_dir()))
}

#[test]
fn test_capacity_evicts_oldest() {
    let mut log = HistoryLog::new(&standard_schema(), &HistorySettings::default(), None);
    for i in 0..41 {
        log.add_entry(logged(&format!("q{i}")));
    }
    assert_eq!(log.len(), 40);
    assert_eq!(log.entries()[0].entry.patterns.simple.as_deref(), Some("q40"));
    assert_eq!(log.entries()[39].entry.patterns.simple.as_deref(), Some("q1"));
    assert!(!log.entries().iter().any(|q| q.entry.patterns.simple.as_deref() == Some("q0")));
}

#[test]
fn test_duplicate_moves_to_front() {
    let mut log = HistoryLog::new(&standard_schema(), &HistorySettings::default(), None);
    log.add_entry(logged("a"));
    log.add_entry(logged("b"));
    log.add_entry(logged("c"));
    log.add_entry(logged("a"));

    let order: Vec<_> =
        log.entries().iter().map(|q| q.entry.patterns.simple.clone().unwrap()).collect();
    assert_eq!(order, vec!["a", "c", "b"]);
}

#[test]
fn test_file_store_survives_reload() {
    let workspace = Workspace::new();
    let schema = standard_schema();
    let mut log = HistoryLog::new(&schema, &HistorySettings::default(), Some(file_store(&workspace)));
    log.add_entry(logged("a"));
    log.add_entry(logged("b"));

    let reloaded =
        HistoryLog::load(&schema, &HistorySettings::default(), Some(file_store(&workspace)));
    assert_eq!(reloaded.entries(), log.entries());

    let json = file_store(&workspace).get("cf/history/zeeland").unwrap().unwrap();
    let record: PersistedHistory = serde_json::from_str(&json).unwrap();
    assert_eq!(record.version, HISTORY_VERSION);
    assert_eq!(record.index_last_modified, "2024-03-01 12:00:00");
    assert_eq!(record.history.len(), 2);
}

#[test]
fn test_rebuilt_index_discards_history() {
    let workspace = Workspace::new();
    let mut log = HistoryLog::new(
        &standard_schema(),
        &HistorySettings::default(),
        Some(file_store(&workspace)),
    );
    log.add_entry(logged("a"));

    let rebuilt = SchemaBuilder::new().time_modified("2024-04-01 08:00:00").build();
    let reloaded =
        HistoryLog::load(&rebuilt, &HistorySettings::default(), Some(file_store(&workspace)));
    assert!(reloaded.is_empty());
    assert_eq!(file_store(&workspace).get("cf/history/zeeland").unwrap(), None);
}

#[test]
fn test_namespace_setting() {
    let settings = HistorySettings { namespace: "portal".to_string(), ..Default::default() };
    let log = HistoryLog::new(&standard_schema(), &settings, None);
    assert_eq!(log.key(), "portal/history/zeeland");
}

#[test]
fn test_url_sync_logs_pushed_queries() {
    let workspace = Workspace::new();
    let schema = standard_schema();
    let config = Config::default();
    let start = Url::parse(&format!("{BASE_URL}/")).unwrap();
    let mut sync = UrlSync::new(
        MemoryNavigator::new(start),
        Encoder::new(schema.clone(), config.clone()),
        Classifier::new(schema.clone(), config.clone()),
        HistoryLog::load(&schema, &config.history, Some(file_store(&workspace))),
    );

    let state = viewing_hits(
        QueryForm::Search(PatternQuery::Simple(Some("dog".to_string()))),
        FilterMap::new(),
    );
    assert!(matches!(sync.publish(&state).unwrap(), SyncOutcome::Pushed { .. }));
    assert_eq!(sync.publish(&state).unwrap(), SyncOutcome::Unchanged);
    assert_eq!(sync.publish(&SearchState::default()).unwrap(), SyncOutcome::Pushed {
        url: Url::parse(BASE_URL).unwrap(),
        is_truncated: false,
    });

    let reloaded = HistoryLog::load(&schema, &config.history, Some(file_store(&workspace)));
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.entries()[1].display_values.pattern, r#"[word="dog"]"#);
}
