//! Restoring a session from the auto-save record.
//!
//! The record is replayed through the ordinary action methods so restored
//! state passes the same checks as live edits. History is cleared at the
//! end; the restored assembly becomes the new baseline.

use log::{info, warn};
use serde::Serialize;

use chrono::{DateTime, Utc};

use crate::error::{Result, StoreError};
use crate::model::{SurfaceSide, SurfaceUpdate};
use crate::state::autosave::{AutosaveRecord, AUTOSAVE_VERSION};
use crate::state::storage::KeyValueStorage;
use crate::state::store::Store;

/// What a restore brought back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestoreSummary {
    pub saved_at: DateTime<Utc>,
    pub layers: usize,
    pub monitors: usize,
    /// Entries in the record that the store refused (invalid thickness or
    /// duplicate id).
    pub skipped: usize,
}

/// Read and parse the record stored under `key`.
pub fn load_record<S: KeyValueStorage + ?Sized>(storage: &S, key: &str) -> Result<Option<AutosaveRecord>> {
    let Some(json) = storage.get(key)? else {
        return Ok(None);
    };
    let record: AutosaveRecord = serde_json::from_str(&json)?;
    if record.version > AUTOSAVE_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: record.version,
            supported: AUTOSAVE_VERSION,
        });
    }
    Ok(Some(record))
}

/// Replay `record` into `store`, replacing its assembly, project, climate and
/// UI preferences.
pub fn apply_record(store: &mut Store, record: AutosaveRecord) -> RestoreSummary {
    let content = record.content;
    let expected = content.assembly.layers.len() + content.assembly.monitors.len();

    store.reset_assembly();
    store.update_surface(
        SurfaceSide::Exterior,
        SurfaceUpdate::from(&content.assembly.surfaces.exterior),
    );
    store.update_surface(
        SurfaceSide::Interior,
        SurfaceUpdate::from(&content.assembly.surfaces.interior),
    );
    for layer in content.assembly.layers {
        store.add_layer(layer);
    }
    // Monitors whose layer was deleted before the save come back dangling.
    for monitor in content.assembly.monitors {
        store.restore_monitor(monitor);
    }
    store.set_project(content.project);
    store.set_climate(content.climate);
    store.set_ui_preferences(content.ui);
    store.clear_history();

    let summary = RestoreSummary {
        saved_at: record.saved_at,
        layers: store.layers().len(),
        monitors: store.monitors().len(),
        skipped: expected - store.layers().len() - store.monitors().len(),
    };
    if summary.skipped > 0 {
        warn!("restore: {} entries in the record were rejected", summary.skipped);
    }
    info!(
        "restore: {} layers, {} monitors from {}",
        summary.layers, summary.monitors, summary.saved_at
    );
    summary
}

/// Load the record under `key` and replay it. `Ok(None)` if nothing was saved.
#[tracing::instrument(skip(store, storage))]
pub fn restore_autosave<S: KeyValueStorage + ?Sized>(
    store: &mut Store,
    storage: &S,
    key: &str,
) -> Result<Option<RestoreSummary>> {
    match load_record(storage, key)? {
        Some(record) => Ok(Some(apply_record(store, record))),
        None => Ok(None),
    }
}
