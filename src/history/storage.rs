//! Key/value persistence: in-memory and one-file-per-key on disk with atomic writes

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

const APP_DIR_NAME: &str = "corpus-query-state";
const STORE_DIR_NAME: &str = "store";

// Characters that cannot appear in a file name on common platforms
const KEY_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'*')
    .add(b'<')
    .add(b'>')
    .add(b'|')
    .add(b'?')
    .add(b'\\')
    .add(b'/')
    .add(b':')
    .add(b'.');

/// String storage keyed by string, such as browser local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().map_err(|_| anyhow!("Memory store lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| anyhow!("Memory store lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| anyhow!("Memory store lock poisoned"))?;
        values.remove(key);
        Ok(())
    }
}

/// One file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the platform data directory.
    pub fn open_default() -> Result<Self> {
        let base = dirs::data_dir().context("Failed to get platform data directory")?;
        Ok(Self::new(base.join(APP_DIR_NAME).join(STORE_DIR_NAME)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`. Keys are percent-encoded so `cf/history/x` stays one file.
    pub fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", utf8_percent_encode(key, KEY_ENCODE_SET)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).context("Failed to create store directory")?;

        // Write atomically (temp file + rename)
        let path = self.key_path(key);
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, value).context("Failed to write store temp file")?;
        fs::rename(&temp, &path).context("Failed to rename store temp file")?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}
