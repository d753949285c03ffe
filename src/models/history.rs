use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::explore::ExploreState;
use super::filter::FilterMap;
use super::interface::InterfaceState;
use super::pattern::PatternState;
use super::results::{GlobalSettings, ViewSettings};

/// Length of the hex content hash.
const HASH_LEN: usize = 16;

/// Immutable snapshot of a query: enough to restore every form and result view.
///
/// Attached to browser navigation entries and stored in the history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub filters: FilterMap,
    pub patterns: PatternState,
    pub explore: ExploreState,
    pub interface: InterfaceState,
    pub hits: ViewSettings,
    pub docs: ViewSettings,
    pub global: GlobalSettings,
}

impl HistoryEntry {
    /// Hash of the canonical JSON form. Maps are ordered, so equal entries hash equally.
    pub fn content_hash(&self) -> String {
        let canonical = serde_json::to_vec(self).unwrap_or_else(|_| format!("{self:?}").into_bytes());
        let digest = Sha256::digest(&canonical);
        hex::encode(digest)[..HASH_LEN].to_string()
    }
}
