use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use url::Url;

use crate::config::Config;
use crate::decode::Classifier;
use crate::encode::{EncodedUrl, Encoder};
use crate::history::{DisplayValues, FileStore, HistoryLog, KeyValueStore, LoggedQuery};
use crate::models::{CorpusSchema, HistoryEntry, SearchState};

fn load_schema(path: &Path) -> Result<CorpusSchema> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus schema: {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse corpus schema: {}", path.display()))
}

fn open_store(dir: Option<&Path>) -> Result<Arc<dyn KeyValueStore>> {
    let store = match dir {
        Some(dir) => FileStore::new(dir),
        None => FileStore::open_default()?,
    };
    Ok(Arc::new(store))
}

pub fn decode(config: &Config, schema: &Path, url: &str) -> Result<()> {
    let classifier = Classifier::new(load_schema(schema)?, config.clone());
    let url = Url::parse(url).with_context(|| format!("Invalid url: {url}"))?;

    let classification = classifier.decode_url(&url)?;
    println!("{}", serde_json::to_string_pretty(&classification)?);
    Ok(())
}

pub fn encode(
    config: &Config,
    schema: &Path,
    state: &Path,
    current: &str,
    record: bool,
    store: Option<&Path>,
) -> Result<()> {
    let schema = load_schema(schema)?;
    let json = fs::read_to_string(state)
        .with_context(|| format!("Failed to read state file: {}", state.display()))?;
    let entry: HistoryEntry = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse state file: {}", state.display()))?;
    let current = Url::parse(current).with_context(|| format!("Invalid url: {current}"))?;

    let encoder = Encoder::new(schema.clone(), config.clone());
    let EncodedUrl { url, is_truncated, entry, params } =
        encoder.encode(&SearchState::from_entry(&entry), &current)?;

    println!("{url}");
    println!("Truncated: {is_truncated}");

    if record {
        let mut log = HistoryLog::load(&schema, &config.history, Some(open_store(store)?));
        let display_values = DisplayValues {
            filters: params.as_ref().and_then(|p| p.filter.clone()).unwrap_or_default(),
            pattern: params.as_ref().and_then(|p| p.patt.clone()).unwrap_or_default(),
        };
        log.add_entry(LoggedQuery::new(entry, url.as_str(), display_values));
        println!("History entries: {}", log.len());
    }

    Ok(())
}

pub fn history(config: &Config, schema: &Path, store: Option<&Path>) -> Result<()> {
    let schema = load_schema(schema)?;
    let log = HistoryLog::load(&schema, &config.history, Some(open_store(store)?));

    println!("Search history for {}", schema.id);
    println!("================================");
    println!("Total entries: {}", log.len());
    for (i, query) in log.entries().iter().enumerate() {
        println!();
        println!("{}. {}", i + 1, query.url);
        if !query.display_values.pattern.is_empty() {
            println!("   Pattern: {}", query.display_values.pattern);
        }
        if !query.display_values.filters.is_empty() {
            println!("   Filters: {}", query.display_values.filters);
        }
    }

    Ok(())
}
