use std::sync::Arc;

use chrono::Local;
use tokio::sync::Mutex;
use tracing::warn;

use crate::store::{read_json, write_json, Store, HISTORY_KEY};
use crate::types::{HistoryEntry, MediaKind};

pub const HISTORY_LIMIT: usize = 15;

/// Completed downloads, most recent first. Every mutation is written through.
pub struct HistoryRecorder {
    store: Arc<dyn Store>,
    entries: Mutex<Vec<HistoryEntry>>,
}

impl HistoryRecorder {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub async fn load(&self) {
        let mut saved: Vec<HistoryEntry> =
            read_json(self.store.as_ref(), HISTORY_KEY).unwrap_or_default();
        saved.truncate(HISTORY_LIMIT);
        *self.entries.lock().await = saved;
    }

    pub async fn record(&self, entry: HistoryEntry) {
        let mut entries = self.entries.lock().await;
        entries.insert(0, entry);
        entries.truncate(HISTORY_LIMIT);
        if let Err(err) = write_json(self.store.as_ref(), HISTORY_KEY, &*entries) {
            warn!("failed to persist history: {err:#}");
        }
    }

    pub async fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.lock().await.clone()
    }

    /// Link of the entry at `index`, for refilling the url field.
    pub async fn select(&self, index: usize) -> Option<String> {
        self.entries
            .lock()
            .await
            .get(index)
            .map(|entry| entry.link.clone())
    }
}

pub fn entry_now(link: &str, filename: &str, kind: MediaKind) -> HistoryEntry {
    HistoryEntry {
        link: link.to_string(),
        filename: filename.to_string(),
        date: Local::now().format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
        kind,
    }
}
