//! UI-facing state: persisted preferences, display settings and the
//! simulation status indicator.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
}

/// The subset of UI state kept across sessions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiPreferences {
    pub collapsed_panels: BTreeSet<String>,
    pub expanded_sections: BTreeSet<String>,
    /// Per-modal flags such as "don't show again".
    pub modal_preferences: BTreeMap<String, bool>,
    pub selected_tab: Option<String>,
    pub theme: Theme,
}

impl UiPreferences {
    pub fn toggle_panel(&mut self, panel: &str) {
        if !self.collapsed_panels.remove(panel) {
            self.collapsed_panels.insert(panel.to_string());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Millimetres,
    Centimetres,
    Metres,
}

impl LengthUnit {
    /// Convert a length in metres into this unit.
    pub fn from_metres(&self, metres: f64) -> f64 {
        match self {
            LengthUnit::Millimetres => metres * 1000.0,
            LengthUnit::Centimetres => metres * 100.0,
            LengthUnit::Metres => metres,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            LengthUnit::Millimetres => "mm",
            LengthUnit::Centimetres => "cm",
            LengthUnit::Metres => "m",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplaySettings {
    pub length_unit: LengthUnit,
    pub show_grid: bool,
    pub show_monitors: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            length_unit: LengthUnit::Millimetres,
            show_grid: false,
            show_monitors: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SimulationStatus {
    #[default]
    Idle,
    Running {
        progress: f64,
    },
    Completed {
        finished_at: DateTime<Utc>,
    },
    Failed {
        message: String,
    },
}

impl SimulationStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, SimulationStatus::Running { .. })
    }
}
