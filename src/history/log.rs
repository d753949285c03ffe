//! Bounded, deduplicated log of submitted queries, persisted per corpus.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::storage::KeyValueStore;
use crate::config::HistorySettings;
use crate::models::{CorpusSchema, HistoryEntry};

/// Format version of the persisted record. Records with another version are discarded.
pub const HISTORY_VERSION: u32 = 2;

/// Strings shown for an entry in a history list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayValues {
    pub filters: String,
    pub pattern: String,
}

/// A history entry together with the url it was published under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedQuery {
    pub entry: HistoryEntry,
    pub url: String,
    pub display_values: DisplayValues,
    pub hash: String,
}

impl LoggedQuery {
    pub fn new(entry: HistoryEntry, url: impl Into<String>, display_values: DisplayValues) -> Self {
        let hash = entry.content_hash();
        Self { entry, url: url.into(), display_values, hash }
    }
}

/// Persisted form of the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedHistory {
    pub version: u32,
    pub index_last_modified: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    pub history: Vec<LoggedQuery>,
}

pub struct HistoryLog {
    key: String,
    index_last_modified: String,
    capacity: usize,
    store: Option<Arc<dyn KeyValueStore>>,
    entries: Vec<LoggedQuery>,
}

impl HistoryLog {
    /// Empty log for `schema`. Without a store nothing is persisted.
    pub fn new(
        schema: &CorpusSchema,
        settings: &HistorySettings,
        store: Option<Arc<dyn KeyValueStore>>,
    ) -> Self {
        Self {
            key: format!("{}/history/{}", settings.namespace, schema.id),
            index_last_modified: schema.time_modified.clone(),
            capacity: settings.capacity,
            store,
            entries: Vec::new(),
        }
    }

    /// Log for `schema` filled from the store.
    ///
    /// A record saved against another index build or format version is removed from the store
    /// and the log starts empty. Unreadable records are ignored.
    pub fn load(
        schema: &CorpusSchema,
        settings: &HistorySettings,
        store: Option<Arc<dyn KeyValueStore>>,
    ) -> Self {
        let mut log = Self::new(schema, settings, store);
        if let Some(history) = log.read() {
            log.replace_all(history);
        }
        log
    }

    fn read(&self) -> Option<Vec<LoggedQuery>> {
        let store = self.store.as_ref()?;
        let json = match store.get(&self.key) {
            Ok(json) => json?,
            Err(err) => {
                warn!(key = %self.key, error = %err, "could not read search history");
                return None;
            }
        };

        let record: PersistedHistory = match serde_json::from_str(&json) {
            Ok(record) => record,
            Err(err) => {
                warn!(key = %self.key, error = %err, "could not parse search history");
                return None;
            }
        };

        let stale = if record.index_last_modified != self.index_last_modified {
            info!(key = %self.key, "corpus was modified since history was saved, clearing history");
            true
        } else if record.version != HISTORY_VERSION {
            info!(
                key = %self.key,
                found = record.version,
                expected = HISTORY_VERSION,
                "history out of date, clearing history"
            );
            true
        } else {
            false
        };
        if stale {
            if let Err(err) = store.remove(&self.key) {
                warn!(key = %self.key, error = %err, "could not remove stale search history");
            }
            return None;
        }

        Some(record.history)
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let record = PersistedHistory {
            version: HISTORY_VERSION,
            index_last_modified: self.index_last_modified.clone(),
            saved_at: Some(Utc::now()),
            history: self.entries.clone(),
        };
        let result = serde_json::to_string(&record)
            .map_err(anyhow::Error::from)
            .and_then(|json| store.set(&self.key, &json));
        match result {
            Ok(()) => debug!(key = %self.key, entries = self.entries.len(), "saved search history"),
            Err(err) => warn!(key = %self.key, error = %err, "could not save search history"),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Most recent first.
    pub fn entries(&self) -> &[LoggedQuery] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Put `query` at the front, dropping an earlier equal entry and the oldest beyond capacity.
    pub fn add_entry(&mut self, query: LoggedQuery) {
        self.entries.retain(|e| e.hash != query.hash);
        self.entries.insert(0, query);
        self.entries.truncate(self.capacity);
        self.persist();
    }

    pub fn remove_entry(&mut self, index: usize) -> Option<LoggedQuery> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);
        self.persist();
        Some(removed)
    }

    /// Replace the whole log without persisting it. Hashes are recomputed from the entries.
    pub fn replace_all(&mut self, entries: Vec<LoggedQuery>) {
        self.entries = entries
            .into_iter()
            .map(|mut q| {
                q.hash = q.entry.content_hash();
                q
            })
            .take(self.capacity)
            .collect();
    }
}
