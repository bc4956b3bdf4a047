//! Debounced auto-save of the assembly, project and climate slices.
//!
//! The manager is driven by an explicit clock: callers pass `Instant`s in,
//! typically from the UI event loop. Each observed change to a watched
//! slice (re)arms a trailing-edge deadline; when the deadline passes
//! without further changes the state is written once. A write is skipped
//! when the content matches what was last written.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::AutosaveConfig;
use crate::model::{ClimateSelection, Layer, Monitor, ProjectInfo, Surfaces, UiPreferences};
use crate::state::storage::KeyValueStorage;
use crate::state::store::AppState;

/// Version written into every record.
pub const AUTOSAVE_VERSION: u32 = 1;

/// The assembly part of a record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyRecord {
    pub layers: Vec<Layer>,
    pub surfaces: Surfaces,
    pub monitors: Vec<Monitor>,
}

/// Everything in a record except its metadata; compared between saves.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveContent {
    #[serde(default)]
    pub ui: UiPreferences,
    pub assembly: AssemblyRecord,
    #[serde(default)]
    pub project: ProjectInfo,
    #[serde(default)]
    pub climate: ClimateSelection,
}

impl AutosaveContent {
    pub fn capture(state: &AppState) -> Self {
        Self {
            ui: (*state.ui).clone(),
            assembly: AssemblyRecord {
                layers: (*state.layers).clone(),
                surfaces: (*state.surfaces).clone(),
                monitors: (*state.monitors).clone(),
            },
            project: (*state.project).clone(),
            climate: (*state.climate).clone(),
        }
    }
}

/// The JSON document stored under the auto-save key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveRecord {
    #[serde(flatten)]
    pub content: AutosaveContent,
    pub saved_at: DateTime<Utc>,
    pub version: u32,
}

/// Result of a save attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved { saved_at: DateTime<Utc>, bytes: usize },
    /// Content identical to the last write; nothing written.
    Unchanged,
    /// The write failed. Reported once; the next change schedules a new attempt.
    Failed { message: String },
}

/// Pointers to the watched slices at the last observation.
#[derive(Debug, Clone)]
struct Watched {
    layers: Arc<Vec<Layer>>,
    surfaces: Arc<Surfaces>,
    monitors: Arc<Vec<Monitor>>,
    project: Arc<ProjectInfo>,
    climate: Arc<ClimateSelection>,
}

impl Watched {
    fn of(state: &AppState) -> Self {
        Self {
            layers: Arc::clone(&state.layers),
            surfaces: Arc::clone(&state.surfaces),
            monitors: Arc::clone(&state.monitors),
            project: Arc::clone(&state.project),
            climate: Arc::clone(&state.climate),
        }
    }

    fn matches(&self, state: &AppState) -> bool {
        Arc::ptr_eq(&self.layers, &state.layers)
            && Arc::ptr_eq(&self.surfaces, &state.surfaces)
            && Arc::ptr_eq(&self.monitors, &state.monitors)
            && Arc::ptr_eq(&self.project, &state.project)
            && Arc::ptr_eq(&self.climate, &state.climate)
    }
}

/// Debounced writer of `AutosaveRecord`s.
#[derive(Debug, Clone)]
pub struct AutosaveManager {
    key: String,
    debounce: Duration,
    enabled: bool,
    deadline: Option<Instant>,
    observed: Option<Watched>,
    last_digest: Option<[u8; 32]>,
    last_saved_at: Option<DateTime<Utc>>,
}

impl Default for AutosaveManager {
    fn default() -> Self {
        Self::new(&AutosaveConfig::default())
    }
}

impl AutosaveManager {
    pub fn new(config: &AutosaveConfig) -> Self {
        Self {
            key: config.key.clone(),
            debounce: config.debounce(),
            enabled: config.enabled,
            deadline: None,
            observed: None,
            last_digest: None,
            last_saved_at: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    /// Take `state` as the already-persisted baseline without scheduling a save.
    pub fn set_baseline(&mut self, state: &AppState) {
        self.observed = Some(Watched::of(state));
        self.last_digest = digest_of(&AutosaveContent::capture(state)).ok();
    }

    /// Note the current state. Returns true if a save was (re)scheduled.
    ///
    /// The first observation only records a baseline.
    pub fn observe(&mut self, state: &AppState, now: Instant) -> bool {
        let changed = match &self.observed {
            None => false,
            Some(watched) => !watched.matches(state),
        };
        self.observed = Some(Watched::of(state));

        if !changed || !self.enabled {
            return false;
        }
        // Trailing edge: every change pushes the deadline out again.
        self.deadline = Some(now + self.debounce);
        debug!("autosave: scheduled in {:?}", self.debounce);
        true
    }

    /// Save if the deadline has passed.
    pub fn poll<S: KeyValueStorage + ?Sized>(
        &mut self,
        state: &AppState,
        storage: &mut S,
        now: Instant,
    ) -> Option<SaveOutcome> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(self.write(state, storage))
            }
            _ => None,
        }
    }

    /// `observe` followed by `poll`.
    pub fn tick<S: KeyValueStorage + ?Sized>(
        &mut self,
        state: &AppState,
        storage: &mut S,
        now: Instant,
    ) -> Option<SaveOutcome> {
        self.observe(state, now);
        self.poll(state, storage, now)
    }

    /// Cancel any pending save and write immediately.
    #[tracing::instrument(skip(self, state, storage), fields(key = %self.key))]
    pub fn save_now<S: KeyValueStorage + ?Sized>(
        &mut self,
        state: &AppState,
        storage: &mut S,
    ) -> SaveOutcome {
        self.deadline = None;
        self.observed = Some(Watched::of(state));
        self.write(state, storage)
    }

    /// Drop the pending save, e.g. when the owning view goes away.
    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            debug!("autosave: pending save cancelled");
        }
    }

    fn write<S: KeyValueStorage + ?Sized>(&mut self, state: &AppState, storage: &mut S) -> SaveOutcome {
        let content = AutosaveContent::capture(state);
        let digest = match digest_of(&content) {
            Ok(digest) => digest,
            Err(e) => return self.failed(e.to_string()),
        };
        if self.last_digest == Some(digest) {
            debug!("autosave: content unchanged, skipping write");
            return SaveOutcome::Unchanged;
        }

        let saved_at = Utc::now();
        let record = AutosaveRecord {
            content,
            saved_at,
            version: AUTOSAVE_VERSION,
        };
        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(e) => return self.failed(e.to_string()),
        };
        if let Err(e) = storage.set(&self.key, &json) {
            return self.failed(e.to_string());
        }

        self.last_digest = Some(digest);
        self.last_saved_at = Some(saved_at);
        info!("autosave: wrote {} bytes to '{}'", json.len(), self.key);
        SaveOutcome::Saved {
            saved_at,
            bytes: json.len(),
        }
    }

    fn failed(&self, message: String) -> SaveOutcome {
        warn!("autosave: save failed: {}", message);
        SaveOutcome::Failed { message }
    }
}

fn digest_of(content: &AutosaveContent) -> serde_json::Result<[u8; 32]> {
    let bytes = serde_json::to_vec(content)?;
    Ok(Sha256::digest(&bytes).into())
}
