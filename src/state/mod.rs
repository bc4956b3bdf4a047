//! State Management Module
//!
//! The undoable store, its history and subscriptions, plus the persistence
//! collaborators: storage backends, debounced auto-save, UI-preference
//! persistence and session restore.

pub mod action;
pub mod autosave;
pub mod history;
pub mod preferences;
pub mod recovery;
pub mod storage;
pub mod store;
pub mod subscription;

pub use action::Action;
pub use autosave::{AutosaveManager, AutosaveRecord, SaveOutcome, AUTOSAVE_VERSION};
pub use history::{History, HistoryEntry, HistoryOp, DEFAULT_MAX_STEPS};
pub use preferences::PreferencesPersister;
pub use recovery::{restore_autosave, RestoreSummary};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{AppState, Store};
pub use subscription::{Slice, StateChange, SubscriptionId};
