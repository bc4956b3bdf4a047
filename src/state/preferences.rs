//! Persistence of the UI-preference subset.
//!
//! Unlike the auto-save, preferences are written as soon as they change;
//! they are small and a lost panel toggle is merely annoying.

use std::sync::Arc;

use log::{debug, warn};

use crate::error::Result;
use crate::model::UiPreferences;
use crate::state::storage::KeyValueStorage;
use crate::state::store::Store;

#[derive(Debug, Clone)]
pub struct PreferencesPersister {
    key: String,
    written: Option<Arc<UiPreferences>>,
}

impl PreferencesPersister {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            written: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load stored preferences into `store`. Returns false if none were stored.
    ///
    /// Unreadable JSON is logged and ignored; defaults stay in place.
    pub fn restore<S: KeyValueStorage + ?Sized>(&mut self, store: &mut Store, storage: &S) -> Result<bool> {
        let Some(json) = storage.get(&self.key)? else {
            return Ok(false);
        };
        match serde_json::from_str::<UiPreferences>(&json) {
            Ok(preferences) => {
                store.set_ui_preferences(preferences);
                self.written = Some(Arc::clone(&store.state().ui));
                Ok(true)
            }
            Err(e) => {
                warn!("preferences: ignoring unreadable '{}': {}", self.key, e);
                Ok(false)
            }
        }
    }

    /// Write the preferences if they changed since the last write.
    /// Returns true if something was written.
    pub fn sync<S: KeyValueStorage + ?Sized>(&mut self, store: &Store, storage: &mut S) -> Result<bool> {
        let current = &store.state().ui;
        if let Some(written) = &self.written {
            if Arc::ptr_eq(written, current) || **written == **current {
                return Ok(false);
            }
        }
        let json = serde_json::to_string(current.as_ref())?;
        storage.set(&self.key, &json)?;
        self.written = Some(Arc::clone(current));
        debug!("preferences: wrote '{}'", self.key);
        Ok(true)
    }
}
