//! Serializable form of every store action.
//!
//! `Store::dispatch` accepts these, which lets scripts and the CLI drive the
//! store through exactly the same path as direct method calls.

use serde::{Deserialize, Serialize};

use crate::model::{
    AdvancedSettings, CalculationPeriod, ClimateSelection, DisplaySettings, Layer, LayerUpdate,
    Monitor, MonitorUpdate, Orientation, ProjectInfo, ProjectUpdate, SimulationStatus,
    SurfaceSide, SurfaceUpdate, UiPreferences,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "action",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    AddLayer { layer: Layer },
    UpdateLayer { id: String, updates: LayerUpdate },
    DeleteLayer { id: String },
    ReorderLayers { from_index: usize, to_index: usize },
    DuplicateLayer { id: String },
    UpdateSurface { side: SurfaceSide, updates: SurfaceUpdate },
    AddMonitor { monitor: Monitor },
    UpdateMonitor { id: String, updates: MonitorUpdate },
    DeleteMonitor { id: String },
    Undo,
    Redo,
    SetProject { project: ProjectInfo },
    UpdateProject { updates: ProjectUpdate },
    SetOrientation { orientation: Orientation },
    SetCalculationPeriod { period: CalculationPeriod },
    SetAdvancedSettings { settings: AdvancedSettings },
    SetClimate { climate: ClimateSelection },
    SetDisplaySettings { settings: DisplaySettings },
    SetUiPreferences { preferences: UiPreferences },
    SetSimulationStatus { status: SimulationStatus },
    ClearHistory,
    ResetAssembly,
}

impl Action {
    /// Stable name used in logs and change notifications.
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddLayer { .. } => "addLayer",
            Action::UpdateLayer { .. } => "updateLayer",
            Action::DeleteLayer { .. } => "deleteLayer",
            Action::ReorderLayers { .. } => "reorderLayers",
            Action::DuplicateLayer { .. } => "duplicateLayer",
            Action::UpdateSurface { .. } => "updateSurface",
            Action::AddMonitor { .. } => "addMonitor",
            Action::UpdateMonitor { .. } => "updateMonitor",
            Action::DeleteMonitor { .. } => "deleteMonitor",
            Action::Undo => "undo",
            Action::Redo => "redo",
            Action::SetProject { .. } => "setProject",
            Action::UpdateProject { .. } => "updateProject",
            Action::SetOrientation { .. } => "setOrientation",
            Action::SetCalculationPeriod { .. } => "setCalculationPeriod",
            Action::SetAdvancedSettings { .. } => "setAdvancedSettings",
            Action::SetClimate { .. } => "setClimate",
            Action::SetDisplaySettings { .. } => "setDisplaySettings",
            Action::SetUiPreferences { .. } => "setUiPreferences",
            Action::SetSimulationStatus { .. } => "setSimulationStatus",
            Action::ClearHistory => "clearHistory",
            Action::ResetAssembly => "resetAssembly",
        }
    }
}
