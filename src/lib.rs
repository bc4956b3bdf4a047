//! Layerstack - Assembly Configuration State
//!
//! State core of a hygrothermal building-assembly editor:
//! - An undoable store of layers, surfaces and monitors with derived totals
//! - Project, climate and UI settings behind plain setters
//! - Debounced auto-save and session restore over pluggable storage
//!
//! # Architecture
//!
//! The `Store` is the single writer. Front ends call its action methods (or
//! `dispatch` serialized `Action`s) and read snapshots; they subscribe to
//! slices to learn about changes. Persistence collaborators observe the
//! store from outside and write through `KeyValueStorage`.

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod state;

pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use state::{Action, AppState, Store};
