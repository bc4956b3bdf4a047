//! Undo/Redo History
//!
//! A linear two-stack history. Each entry records one mutation as a
//! `HistoryOp` carrying exactly what is needed to both invert and replay it;
//! the store applies entries by matching on the op.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Layer, Monitor};

/// Default maximum number of undo steps to keep.
pub const DEFAULT_MAX_STEPS: usize = 20;

/// A reversible mutation of the assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum HistoryOp {
    /// A layer was appended (also used by duplicate).
    AddLayer { layer: Layer },

    /// A layer was merged with an update; both versions are kept.
    UpdateLayer { before: Layer, after: Layer },

    /// A layer was removed from `index`.
    DeleteLayer { layer: Layer, index: usize },

    /// The layer at `from` was moved to `to`.
    ReorderLayers { from: usize, to: usize },

    AddMonitor { monitor: Monitor },

    DeleteMonitor { monitor: Monitor, index: usize },
}

impl HistoryOp {
    /// Whether applying this op changes the layer sequence.
    pub fn touches_layers(&self) -> bool {
        !matches!(
            self,
            HistoryOp::AddMonitor { .. } | HistoryOp::DeleteMonitor { .. }
        )
    }
}

impl std::fmt::Display for HistoryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryOp::AddLayer { layer } => write!(f, "Add layer '{}'", layer.display_name()),
            HistoryOp::UpdateLayer { after, .. } => {
                write!(f, "Edit layer '{}'", after.display_name())
            }
            HistoryOp::DeleteLayer { layer, .. } => {
                write!(f, "Delete layer '{}'", layer.display_name())
            }
            HistoryOp::ReorderLayers { from, to } => write!(f, "Move layer {} to {}", from, to),
            HistoryOp::AddMonitor { monitor } => write!(f, "Add monitor '{}'", monitor.name),
            HistoryOp::DeleteMonitor { monitor, .. } => {
                write!(f, "Delete monitor '{}'", monitor.name)
            }
        }
    }
}

/// One recorded mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,

    pub op: HistoryOp,

    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(op: HistoryOp) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            op,
            timestamp: Utc::now(),
        }
    }
}

/// Bounded past/future stacks.
///
/// `past` is oldest-first; `future` is nearest-first, so `future[0]` is the
/// entry the next redo replays.
#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<HistoryEntry>,
    future: VecDeque<HistoryEntry>,
    max_steps: usize,
    evicted: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STEPS)
    }
}

impl History {
    /// Create an empty history. A limit of zero is raised to one.
    pub fn new(max_steps: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            max_steps: max_steps.max(1),
            evicted: 0,
        }
    }

    /// Record a new mutation. Discards the redo branch and evicts the
    /// oldest entries beyond the limit.
    pub fn record(&mut self, op: HistoryOp) {
        log::debug!("history: record {}", op);
        self.future.clear();
        self.past.push_back(HistoryEntry::new(op));
        self.trim();
    }

    /// Move the newest past entry onto the front of `future` and return it.
    pub fn step_back(&mut self) -> Option<&HistoryEntry> {
        let entry = self.past.pop_back()?;
        self.future.push_front(entry);
        self.future.front()
    }

    /// Move the nearest future entry back onto `past` and return it.
    pub fn step_forward(&mut self) -> Option<&HistoryEntry> {
        let entry = self.future.pop_front()?;
        self.past.push_back(entry);
        self.past.back()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.past.iter()
    }

    pub fn future(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.future.iter()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn peek_undo(&self) -> Option<&HistoryEntry> {
        self.past.back()
    }

    pub fn peek_redo(&self) -> Option<&HistoryEntry> {
        self.future.front()
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Change the limit, trimming the oldest entries if needed.
    pub fn set_max_steps(&mut self, max_steps: usize) {
        self.max_steps = max_steps.max(1);
        self.trim();
    }

    /// Number of entries dropped by the size limit since creation.
    pub fn evicted(&self) -> usize {
        self.evicted
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    fn trim(&mut self) {
        while self.past.len() > self.max_steps {
            if let Some(dropped) = self.past.pop_front() {
                log::debug!("history: evicted {}", dropped.op);
                self.evicted += 1;
            }
        }
    }
}
