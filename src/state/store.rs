//! Application State Store
//!
//! Single owner of all assembly, project and UI state. Every change goes
//! through an action method; actions never fail. Unknown ids and invalid
//! input leave the state untouched.
//!
//! State sub-trees are held behind `Arc`. An action clones the current
//! `AppState` (pointer copies only) before mutating through
//! `Arc::make_mut`, so each touched slice is rebuilt while untouched slices
//! stay shared with earlier snapshots. Comparing pointers afterwards gives
//! the set of changed slices for subscribers.

use std::collections::BTreeSet;
use std::sync::Arc;

use log::{debug, warn};

use crate::config::StoreConfig;
use crate::model::{
    AdvancedSettings, CalculationPeriod, ClimateSelection, DisplaySettings, Layer, LayerUpdate,
    Monitor, MonitorUpdate, Orientation, ProjectInfo, ProjectUpdate, SimulationStatus, Surface,
    SurfaceSide, SurfaceUpdate, Surfaces, UiPreferences,
};
use crate::state::action::Action;
use crate::state::history::{History, HistoryOp};
use crate::state::subscription::{ChangeCallback, Slice, StateChange, Subscribers, SubscriptionId};

/// Immutable snapshot of the whole application state.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Layers ordered exterior to interior.
    pub layers: Arc<Vec<Layer>>,
    pub surfaces: Arc<Surfaces>,
    pub monitors: Arc<Vec<Monitor>>,
    pub project: Arc<ProjectInfo>,
    pub climate: Arc<ClimateSelection>,
    pub ui: Arc<UiPreferences>,
    pub display: Arc<DisplaySettings>,
    pub simulation: Arc<SimulationStatus>,
    /// Sum of all layer thicknesses. Derived; rebuilt after every layer change.
    pub total_thickness: f64,
}

impl AppState {
    /// Slices whose sub-tree differs by pointer between two snapshots.
    pub fn changed_slices(&self, other: &AppState) -> BTreeSet<Slice> {
        let mut slices = BTreeSet::new();
        if !Arc::ptr_eq(&self.layers, &other.layers)
            || self.total_thickness.to_bits() != other.total_thickness.to_bits()
        {
            slices.insert(Slice::Layers);
        }
        if !Arc::ptr_eq(&self.surfaces, &other.surfaces) {
            slices.insert(Slice::Surfaces);
        }
        if !Arc::ptr_eq(&self.monitors, &other.monitors) {
            slices.insert(Slice::Monitors);
        }
        if !Arc::ptr_eq(&self.project, &other.project) {
            slices.insert(Slice::Project);
        }
        if !Arc::ptr_eq(&self.climate, &other.climate) {
            slices.insert(Slice::Climate);
        }
        if !Arc::ptr_eq(&self.ui, &other.ui) {
            slices.insert(Slice::Ui);
        }
        if !Arc::ptr_eq(&self.display, &other.display) {
            slices.insert(Slice::Display);
        }
        if !Arc::ptr_eq(&self.simulation, &other.simulation) {
            slices.insert(Slice::Simulation);
        }
        slices
    }

    pub fn layer_index(&self, id: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    pub fn monitor_index(&self, id: &str) -> Option<usize> {
        self.monitors.iter().position(|m| m.id == id)
    }

    fn recompute_total_thickness(&mut self) {
        self.total_thickness = self.layers.iter().map(|l| l.thickness).sum();
    }
}

/// State captured at the start of an action, for change detection.
struct Checkpoint {
    state: AppState,
    can_undo: bool,
    can_redo: bool,
}

/// The state store.
pub struct Store {
    state: AppState,
    history: History,
    subscribers: Subscribers,
    revision: u64,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("history", &self.history)
            .field("subscribers", &self.subscribers)
            .field("revision", &self.revision)
            .finish()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Empty store with the default history limit.
    pub fn new() -> Self {
        Self::with_history(History::default())
    }

    pub fn with_config(config: &StoreConfig) -> Self {
        Self::with_history(History::new(config.max_history_steps))
    }

    fn with_history(history: History) -> Self {
        Self {
            state: AppState::default(),
            history,
            subscribers: Subscribers::default(),
            revision: 0,
        }
    }

    // ---------------------------------------------------------------------
    // Read surface
    // ---------------------------------------------------------------------

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Cheap copy of the current state; later actions never alter it.
    pub fn snapshot(&self) -> AppState {
        self.state.clone()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.state.layers
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.state.layers.iter().find(|l| l.id == id)
    }

    pub fn monitors(&self) -> &[Monitor] {
        &self.state.monitors
    }

    pub fn monitor(&self, id: &str) -> Option<&Monitor> {
        self.state.monitors.iter().find(|m| m.id == id)
    }

    pub fn surfaces(&self) -> &Surfaces {
        &self.state.surfaces
    }

    pub fn surface(&self, side: SurfaceSide) -> &Surface {
        self.state.surfaces.get(side)
    }

    pub fn project(&self) -> &ProjectInfo {
        &self.state.project
    }

    pub fn climate(&self) -> &ClimateSelection {
        &self.state.climate
    }

    pub fn ui_preferences(&self) -> &UiPreferences {
        &self.state.ui
    }

    pub fn display_settings(&self) -> &DisplaySettings {
        &self.state.display
    }

    pub fn simulation_status(&self) -> &SimulationStatus {
        &self.state.simulation
    }

    pub fn total_thickness(&self) -> f64 {
        self.state.total_thickness
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Incremented once per action that changed anything.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Depth of a monitor below the exterior face, in metres.
    ///
    /// `None` if the monitor is unknown or its anchor layer no longer exists.
    pub fn monitor_depth(&self, id: &str) -> Option<f64> {
        let monitor = self.monitor(id)?;
        let index = self.state.layer_index(&monitor.layer_id)?;
        let offset: f64 = self.state.layers[..index].iter().map(|l| l.thickness).sum();
        Some(offset + monitor.position * self.state.layers[index].thickness)
    }

    /// Monitors whose anchor layer has been deleted.
    pub fn dangling_monitors(&self) -> Vec<&Monitor> {
        self.state
            .monitors
            .iter()
            .filter(|m| self.state.layer_index(&m.layer_id).is_none())
            .collect()
    }

    // ---------------------------------------------------------------------
    // Subscriptions
    // ---------------------------------------------------------------------

    /// Call `callback` after every action that changes one of `slices`.
    /// An empty list subscribes to all slices.
    pub fn subscribe<F>(&mut self, slices: &[Slice], callback: F) -> SubscriptionId
    where
        F: FnMut(&StateChange) + 'static,
    {
        let callback: ChangeCallback = Box::new(callback);
        self.subscribers.add(slices, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    // ---------------------------------------------------------------------
    // Layer actions
    // ---------------------------------------------------------------------

    /// Append a layer.
    pub fn add_layer(&mut self, layer: Layer) {
        if !Layer::is_valid_thickness(layer.thickness) {
            warn!("addLayer: rejected '{}' with thickness {}", layer.id, layer.thickness);
            return;
        }
        if self.state.layer_index(&layer.id).is_some() {
            warn!("addLayer: layer id '{}' already exists", layer.id);
            return;
        }

        let checkpoint = self.checkpoint();
        Arc::make_mut(&mut self.state.layers).push(layer.clone());
        self.state.recompute_total_thickness();
        self.history.record(HistoryOp::AddLayer { layer });
        self.publish("addLayer", checkpoint);
    }

    /// Merge `updates` into the layer with `id`.
    pub fn update_layer(&mut self, id: &str, updates: LayerUpdate) {
        let Some(index) = self.state.layer_index(id) else {
            debug!("updateLayer: no layer '{}'", id);
            return;
        };
        let before = self.state.layers[index].clone();
        let after = before.merged(&updates);
        if !Layer::is_valid_thickness(after.thickness) {
            warn!("updateLayer: rejected thickness {} for '{}'", after.thickness, id);
            return;
        }

        let checkpoint = self.checkpoint();
        Arc::make_mut(&mut self.state.layers)[index] = after.clone();
        self.state.recompute_total_thickness();
        self.history.record(HistoryOp::UpdateLayer { before, after });
        self.publish("updateLayer", checkpoint);
    }

    /// Remove the layer with `id`. Monitors anchored to it are left in place.
    pub fn delete_layer(&mut self, id: &str) {
        let Some(index) = self.state.layer_index(id) else {
            debug!("deleteLayer: no layer '{}'", id);
            return;
        };

        let checkpoint = self.checkpoint();
        let layer = Arc::make_mut(&mut self.state.layers).remove(index);
        self.state.recompute_total_thickness();
        self.history.record(HistoryOp::DeleteLayer { layer, index });
        self.publish("deleteLayer", checkpoint);
    }

    /// Move the layer at `from_index` to `to_index` (array move, not swap).
    pub fn reorder_layers(&mut self, from_index: usize, to_index: usize) {
        let len = self.state.layers.len();
        if from_index >= len || to_index >= len || from_index == to_index {
            debug!("reorderLayers: ignored {} -> {} (len {})", from_index, to_index, len);
            return;
        }

        let checkpoint = self.checkpoint();
        move_item(Arc::make_mut(&mut self.state.layers), from_index, to_index);
        self.state.recompute_total_thickness();
        self.history.record(HistoryOp::ReorderLayers {
            from: from_index,
            to: to_index,
        });
        self.publish("reorderLayers", checkpoint);
    }

    /// Append a copy of the layer with `id` under a fresh id.
    ///
    /// The copy always goes to the end of the sequence, not next to its source.
    pub fn duplicate_layer(&mut self, id: &str) {
        let Some(source) = self.layer(id) else {
            debug!("duplicateLayer: no layer '{}'", id);
            return;
        };
        let copy = source.duplicate();
        self.add_layer(copy);
    }

    // ---------------------------------------------------------------------
    // Surface and monitor actions
    // ---------------------------------------------------------------------

    /// Merge `updates` into one of the two surfaces. Not recorded in history.
    pub fn update_surface(&mut self, side: SurfaceSide, updates: SurfaceUpdate) {
        let next = self.state.surfaces.get(side).merged(&updates);
        if &next == self.state.surfaces.get(side) {
            debug!("updateSurface: {} surface unchanged", side);
            return;
        }

        let checkpoint = self.checkpoint();
        *Arc::make_mut(&mut self.state.surfaces).get_mut(side) = next;
        self.publish("updateSurface", checkpoint);
    }

    /// Append a monitor. Ignored if the id is taken or the anchor layer is missing.
    pub fn add_monitor(&mut self, monitor: Monitor) {
        if self.state.monitor_index(&monitor.id).is_some() {
            warn!("addMonitor: monitor id '{}' already exists", monitor.id);
            return;
        }
        if self.state.layer_index(&monitor.layer_id).is_none() {
            warn!(
                "addMonitor: anchor layer '{}' of '{}' does not exist",
                monitor.layer_id, monitor.id
            );
            return;
        }

        let checkpoint = self.checkpoint();
        Arc::make_mut(&mut self.state.monitors).push(monitor.clone());
        self.history.record(HistoryOp::AddMonitor { monitor });
        self.publish("addMonitor", checkpoint);
    }

    /// Append a monitor read back from a saved session.
    ///
    /// Unlike `add_monitor` the anchor layer may be missing: monitors left
    /// behind by a layer deletion are saved and must come back as dangling.
    pub(crate) fn restore_monitor(&mut self, monitor: Monitor) {
        if self.state.monitor_index(&monitor.id).is_some() {
            warn!("restore: monitor id '{}' already exists", monitor.id);
            return;
        }
        if self.state.layer_index(&monitor.layer_id).is_none() {
            debug!(
                "restore: monitor '{}' has no anchor layer '{}'",
                monitor.id, monitor.layer_id
            );
        }

        let checkpoint = self.checkpoint();
        Arc::make_mut(&mut self.state.monitors).push(monitor.clone());
        self.history.record(HistoryOp::AddMonitor { monitor });
        self.publish("addMonitor", checkpoint);
    }

    /// Merge `updates` into the monitor with `id`. Not recorded in history.
    pub fn update_monitor(&mut self, id: &str, updates: MonitorUpdate) {
        let Some(index) = self.state.monitor_index(id) else {
            debug!("updateMonitor: no monitor '{}'", id);
            return;
        };
        if let Some(layer_id) = &updates.layer_id {
            if self.state.layer_index(layer_id).is_none() {
                warn!("updateMonitor: anchor layer '{}' does not exist", layer_id);
                return;
            }
        }

        let checkpoint = self.checkpoint();
        let monitors = Arc::make_mut(&mut self.state.monitors);
        monitors[index] = monitors[index].merged(&updates);
        self.publish("updateMonitor", checkpoint);
    }

    pub fn delete_monitor(&mut self, id: &str) {
        let Some(index) = self.state.monitor_index(id) else {
            debug!("deleteMonitor: no monitor '{}'", id);
            return;
        };

        let checkpoint = self.checkpoint();
        let monitor = Arc::make_mut(&mut self.state.monitors).remove(index);
        self.history.record(HistoryOp::DeleteMonitor { monitor, index });
        self.publish("deleteMonitor", checkpoint);
    }

    // ---------------------------------------------------------------------
    // Undo / redo
    // ---------------------------------------------------------------------

    /// Revert the most recent recorded action.
    pub fn undo(&mut self) {
        if !self.history.can_undo() {
            debug!("undo: nothing to undo");
            return;
        }
        let checkpoint = self.checkpoint();
        let Some(op) = self.history.step_back().map(|e| e.op.clone()) else {
            return;
        };
        debug!("undo: {}", op);
        self.apply_inverse(&op);
        self.publish("undo", checkpoint);
    }

    /// Replay the most recently undone action.
    pub fn redo(&mut self) {
        if !self.history.can_redo() {
            debug!("redo: nothing to redo");
            return;
        }
        let checkpoint = self.checkpoint();
        let Some(op) = self.history.step_forward().map(|e| e.op.clone()) else {
            return;
        };
        debug!("redo: {}", op);
        self.apply_forward(&op);
        self.publish("redo", checkpoint);
    }

    fn apply_inverse(&mut self, op: &HistoryOp) {
        match op {
            HistoryOp::AddLayer { layer } => self.remove_layer_by_id(&layer.id),
            HistoryOp::UpdateLayer { before, .. } => self.replace_layer(before),
            HistoryOp::DeleteLayer { layer, index } => {
                let layers = Arc::make_mut(&mut self.state.layers);
                let index = (*index).min(layers.len());
                layers.insert(index, layer.clone());
            }
            HistoryOp::ReorderLayers { from, to } => self.move_layer(*to, *from),
            HistoryOp::AddMonitor { monitor } => self.remove_monitor_by_id(&monitor.id),
            HistoryOp::DeleteMonitor { monitor, index } => {
                let monitors = Arc::make_mut(&mut self.state.monitors);
                let index = (*index).min(monitors.len());
                monitors.insert(index, monitor.clone());
            }
        }
        if op.touches_layers() {
            self.state.recompute_total_thickness();
        }
    }

    fn apply_forward(&mut self, op: &HistoryOp) {
        match op {
            HistoryOp::AddLayer { layer } => {
                Arc::make_mut(&mut self.state.layers).push(layer.clone());
            }
            HistoryOp::UpdateLayer { after, .. } => self.replace_layer(after),
            HistoryOp::DeleteLayer { layer, .. } => self.remove_layer_by_id(&layer.id),
            HistoryOp::ReorderLayers { from, to } => self.move_layer(*from, *to),
            HistoryOp::AddMonitor { monitor } => {
                Arc::make_mut(&mut self.state.monitors).push(monitor.clone());
            }
            HistoryOp::DeleteMonitor { monitor, .. } => self.remove_monitor_by_id(&monitor.id),
        }
        if op.touches_layers() {
            self.state.recompute_total_thickness();
        }
    }

    fn remove_layer_by_id(&mut self, id: &str) {
        if let Some(index) = self.state.layer_index(id) {
            Arc::make_mut(&mut self.state.layers).remove(index);
        }
    }

    fn replace_layer(&mut self, layer: &Layer) {
        if let Some(index) = self.state.layer_index(&layer.id) {
            Arc::make_mut(&mut self.state.layers)[index] = layer.clone();
        }
    }

    fn move_layer(&mut self, from: usize, to: usize) {
        let len = self.state.layers.len();
        if from < len && to < len {
            move_item(Arc::make_mut(&mut self.state.layers), from, to);
        }
    }

    fn remove_monitor_by_id(&mut self, id: &str) {
        if let Some(index) = self.state.monitor_index(id) {
            Arc::make_mut(&mut self.state.monitors).remove(index);
        }
    }

    // ---------------------------------------------------------------------
    // Plain setters (no history)
    // ---------------------------------------------------------------------

    pub fn set_project(&mut self, project: ProjectInfo) {
        let checkpoint = self.checkpoint();
        self.state.project = Arc::new(project);
        self.publish("setProject", checkpoint);
    }

    pub fn update_project(&mut self, updates: ProjectUpdate) {
        let checkpoint = self.checkpoint();
        let next = self.state.project.merged(&updates);
        self.state.project = Arc::new(next);
        self.publish("updateProject", checkpoint);
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        let checkpoint = self.checkpoint();
        Arc::make_mut(&mut self.state.project).orientation = orientation;
        self.publish("setOrientation", checkpoint);
    }

    pub fn set_calculation_period(&mut self, period: CalculationPeriod) {
        let checkpoint = self.checkpoint();
        Arc::make_mut(&mut self.state.project).calculation_period = period;
        self.publish("setCalculationPeriod", checkpoint);
    }

    pub fn set_advanced_settings(&mut self, settings: AdvancedSettings) {
        let checkpoint = self.checkpoint();
        Arc::make_mut(&mut self.state.project).advanced = settings;
        self.publish("setAdvancedSettings", checkpoint);
    }

    pub fn set_climate(&mut self, climate: ClimateSelection) {
        let checkpoint = self.checkpoint();
        self.state.climate = Arc::new(climate);
        self.publish("setClimate", checkpoint);
    }

    pub fn set_display_settings(&mut self, settings: DisplaySettings) {
        let checkpoint = self.checkpoint();
        self.state.display = Arc::new(settings);
        self.publish("setDisplaySettings", checkpoint);
    }

    pub fn set_ui_preferences(&mut self, preferences: UiPreferences) {
        let checkpoint = self.checkpoint();
        self.state.ui = Arc::new(preferences);
        self.publish("setUiPreferences", checkpoint);
    }

    /// Edit UI preferences in place, e.g. to toggle a panel.
    pub fn update_ui_preferences(&mut self, edit: impl FnOnce(&mut UiPreferences)) {
        let checkpoint = self.checkpoint();
        edit(Arc::make_mut(&mut self.state.ui));
        self.publish("updateUiPreferences", checkpoint);
    }

    pub fn set_simulation_status(&mut self, status: SimulationStatus) {
        let checkpoint = self.checkpoint();
        self.state.simulation = Arc::new(status);
        self.publish("setSimulationStatus", checkpoint);
    }

    /// Drop all undo and redo entries.
    pub fn clear_history(&mut self) {
        let checkpoint = self.checkpoint();
        self.history.clear();
        self.publish("clearHistory", checkpoint);
    }

    /// Start a fresh assembly: no layers or monitors, default surfaces, empty history.
    pub fn reset_assembly(&mut self) {
        let checkpoint = self.checkpoint();
        self.state.layers = Arc::new(Vec::new());
        self.state.monitors = Arc::new(Vec::new());
        self.state.surfaces = Arc::new(Surfaces::default());
        self.state.recompute_total_thickness();
        self.history.clear();
        self.publish("resetAssembly", checkpoint);
    }

    /// Run a serialized action.
    pub fn dispatch(&mut self, action: Action) {
        debug!("dispatch: {}", action.name());
        match action {
            Action::AddLayer { layer } => self.add_layer(layer),
            Action::UpdateLayer { id, updates } => self.update_layer(&id, updates),
            Action::DeleteLayer { id } => self.delete_layer(&id),
            Action::ReorderLayers {
                from_index,
                to_index,
            } => self.reorder_layers(from_index, to_index),
            Action::DuplicateLayer { id } => self.duplicate_layer(&id),
            Action::UpdateSurface { side, updates } => self.update_surface(side, updates),
            Action::AddMonitor { monitor } => self.add_monitor(monitor),
            Action::UpdateMonitor { id, updates } => self.update_monitor(&id, updates),
            Action::DeleteMonitor { id } => self.delete_monitor(&id),
            Action::Undo => self.undo(),
            Action::Redo => self.redo(),
            Action::SetProject { project } => self.set_project(project),
            Action::UpdateProject { updates } => self.update_project(updates),
            Action::SetOrientation { orientation } => self.set_orientation(orientation),
            Action::SetCalculationPeriod { period } => self.set_calculation_period(period),
            Action::SetAdvancedSettings { settings } => self.set_advanced_settings(settings),
            Action::SetClimate { climate } => self.set_climate(climate),
            Action::SetDisplaySettings { settings } => self.set_display_settings(settings),
            Action::SetUiPreferences { preferences } => self.set_ui_preferences(preferences),
            Action::SetSimulationStatus { status } => self.set_simulation_status(status),
            Action::ClearHistory => self.clear_history(),
            Action::ResetAssembly => self.reset_assembly(),
        }
    }

    // ---------------------------------------------------------------------
    // Change publication
    // ---------------------------------------------------------------------

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            state: self.state.clone(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }

    fn publish(&mut self, action: &'static str, checkpoint: Checkpoint) {
        let mut slices = checkpoint.state.changed_slices(&self.state);
        if checkpoint.can_undo != self.history.can_undo()
            || checkpoint.can_redo != self.history.can_redo()
        {
            slices.insert(Slice::History);
        }
        if slices.is_empty() {
            return;
        }

        self.revision += 1;
        debug!("{}: revision {} changed {:?}", action, self.revision, slices);
        let change = StateChange {
            revision: self.revision,
            action,
            slices,
        };
        self.subscribers.notify(&change);
    }
}

/// Array-move: remove at `from`, reinsert at `to`.
fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    let item = items.remove(from);
    items.insert(to, item);
}
