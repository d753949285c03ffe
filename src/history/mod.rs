//! History of submitted queries and the storage it is persisted in.

pub mod log;
pub mod storage;

pub use log::{DisplayValues, HISTORY_VERSION, HistoryLog, LoggedQuery, PersistedHistory};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
