use std::sync::Arc;

use chrono::SubsecRound;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;

use crate::clock::Clock;
use crate::models::mood::{iso_millis, MoodEntry, MoodEntryDraft};
use crate::storage::{KeyValueStore, StorageError, HISTORY_KEY};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {key}: {source}")]
    PersistenceWrite {
        key: String,
        #[source]
        source: StorageError,
    },
}

/// Device-scoped mood history, newest entry first.
///
/// The in-memory sequence is the source of truth for the session; every
/// append re-serializes the whole sequence under [`HISTORY_KEY`]. A failed
/// write is reported but the entry stays in memory.
pub struct EntryStore {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    history: Mutex<History>,
}

/// Persisted elements that did not parse as a [`MoodEntry`] (e.g. a mood
/// outside the catalog) are kept verbatim and written back after the known
/// entries, so an append never destroys them.
#[derive(Debug, Default)]
struct History {
    entries: Vec<MoodEntry>,
    unrecognized: Vec<Value>,
}

impl History {
    fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut all = Vec::with_capacity(self.entries.len() + self.unrecognized.len());
        for entry in &self.entries {
            all.push(serde_json::to_value(entry)?);
        }
        all.extend(self.unrecognized.iter().cloned());
        serde_json::to_vec(&all)
    }
}

impl EntryStore {
    pub fn open(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let store = Self {
            storage,
            clock,
            history: Mutex::new(History::default()),
        };
        let loaded = store.load();
        tracing::info!(entries = loaded.len(), "Mood history loaded");
        store
    }

    /// Re-read persisted state, replacing the in-memory sequence.
    pub fn load(&self) -> Vec<MoodEntry> {
        let loaded = read_history(self.storage.as_ref());
        let entries = loaded.entries.clone();
        *self.history.lock() = loaded;
        entries
    }

    /// Snapshot of the in-memory sequence.
    pub fn history(&self) -> Vec<MoodEntry> {
        self.history.lock().entries.clone()
    }

    pub fn append(&self, draft: MoodEntryDraft) -> Result<MoodEntry, StoreError> {
        // Held across the write so concurrent appends serialize.
        let mut history = self.history.lock();

        let date = self.clock.now().trunc_subsecs(3);
        let id = unique_id(&history.entries, iso_millis::format(&date));
        let entry = MoodEntry {
            id,
            mood: draft.mood,
            emoji: draft.emoji,
            date,
            journal: draft.journal,
            value: draft.value,
        };
        history.entries.insert(0, entry.clone());

        let payload = history.to_payload()?;
        if let Err(source) = self.storage.set(HISTORY_KEY, &payload) {
            tracing::error!(
                entry_id = %entry.id,
                key = HISTORY_KEY,
                error = %source,
                "Failed to save mood history"
            );
            return Err(StoreError::PersistenceWrite {
                key: HISTORY_KEY.to_string(),
                source,
            });
        }

        tracing::info!(entry_id = %entry.id, mood = %entry.mood, "Mood entry appended");
        Ok(entry)
    }

    /// Used by the readiness check.
    pub fn storage_reachable(&self) -> bool {
        self.storage.get(HISTORY_KEY).is_ok()
    }
}

/// Missing payloads, or payloads that are not a JSON array, yield an empty
/// history. Inside an array each element is parsed on its own.
fn read_history(storage: &dyn KeyValueStore) -> History {
    let bytes = match storage.get(HISTORY_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return History::default(),
        Err(e) => {
            tracing::warn!(key = HISTORY_KEY, error = %e, "Failed to load mood history");
            return History::default();
        }
    };

    let elements: Vec<Value> = match serde_json::from_slice(&bytes) {
        Ok(elements) => elements,
        Err(e) => {
            tracing::warn!(key = HISTORY_KEY, error = %e, "Discarding unparsable mood history");
            return History::default();
        }
    };

    let mut history = History::default();
    for (index, element) in elements.into_iter().enumerate() {
        match MoodEntry::deserialize(&element) {
            Ok(entry) => history.entries.push(entry),
            Err(e) => {
                tracing::warn!(
                    key = HISTORY_KEY,
                    index,
                    error = %e,
                    "Keeping unrecognized mood entry as-is"
                );
                history.unrecognized.push(element);
            }
        }
    }
    history
}

/// Ids are the creation instant; a suffix disambiguates same-millisecond appends.
fn unique_id(history: &[MoodEntry], base: String) -> String {
    if !history.iter().any(|e| e.id == base) {
        return base;
    }
    (1..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !history.iter().any(|e| &e.id == candidate))
        .unwrap_or(base)
}
