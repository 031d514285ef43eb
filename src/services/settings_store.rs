use std::sync::Arc;

use crate::models::settings::ReminderSettings;
use crate::services::entry_store::StoreError;
use crate::storage::{KeyValueStore, SETTINGS_KEY};

pub struct SettingsStore {
    storage: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Stored settings, or the defaults when nothing usable is stored.
    pub fn load(&self) -> ReminderSettings {
        match self.storage.get(SETTINGS_KEY) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!(key = SETTINGS_KEY, error = %e, "Discarding unparsable settings");
                ReminderSettings::default()
            }),
            Ok(None) => ReminderSettings::default(),
            Err(e) => {
                tracing::warn!(key = SETTINGS_KEY, error = %e, "Failed to load settings");
                ReminderSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &ReminderSettings) -> Result<(), StoreError> {
        let payload = serde_json::to_vec(settings)?;
        self.storage
            .set(SETTINGS_KEY, &payload)
            .map_err(|source| StoreError::PersistenceWrite {
                key: SETTINGS_KEY.to_string(),
                source,
            })
    }
}
