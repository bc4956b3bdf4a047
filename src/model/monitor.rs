//! Monitor positions: points of interest anchored inside a layer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Quantities a monitor can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorVariable {
    Temperature,
    RelativeHumidity,
    WaterContent,
    HeatFlux,
    VaporFlux,
    LiquidFlux,
}

/// A tracked measurement point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitor {
    pub id: String,

    pub name: String,

    /// Id of the layer this monitor sits in. May dangle after a layer is deleted.
    pub layer_id: String,

    /// Fractional position across the layer, exterior face = 0.
    pub position: f64,

    pub variables: BTreeSet<MonitorVariable>,

    /// Output interval in hours.
    pub output_interval: f64,

    /// Display color as a hex string.
    pub color: String,
}

impl Monitor {
    /// New monitor with a generated id, recording temperature and humidity hourly.
    pub fn new(name: impl Into<String>, layer_id: impl Into<String>, position: f64) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name, layer_id, position)
    }

    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        layer_id: impl Into<String>,
        position: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            layer_id: layer_id.into(),
            position: clamp_position(position),
            variables: [MonitorVariable::Temperature, MonitorVariable::RelativeHumidity]
                .into_iter()
                .collect(),
            output_interval: 1.0,
            color: "#3b82f6".to_string(),
        }
    }

    pub fn merged(&self, update: &MonitorUpdate) -> Self {
        let mut next = self.clone();
        if let Some(name) = &update.name {
            next.name = name.clone();
        }
        if let Some(layer_id) = &update.layer_id {
            next.layer_id = layer_id.clone();
        }
        if let Some(position) = update.position {
            next.position = clamp_position(position);
        }
        if let Some(variables) = &update.variables {
            next.variables = variables.clone();
        }
        if let Some(interval) = update.output_interval {
            next.output_interval = interval;
        }
        if let Some(color) = &update.color {
            next.color = color.clone();
        }
        next
    }
}

/// Positions outside [0, 1] are pulled back to the nearest face; NaN goes to 0.
pub fn clamp_position(position: f64) -> f64 {
    if position.is_nan() {
        return 0.0;
    }
    position.clamp(0.0, 1.0)
}

/// Partial update for a monitor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeSet<MonitorVariable>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_interval: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_is_clamped() {
        assert_eq!(Monitor::with_id("M1", "m", "L1", 1.7).position, 1.0);
        assert_eq!(Monitor::with_id("M1", "m", "L1", -0.2).position, 0.0);
        assert_eq!(clamp_position(f64::NAN), 0.0);
        assert_eq!(clamp_position(0.25), 0.25);
    }

    #[test]
    fn test_merge_clamps_and_keeps_rest() {
        let monitor = Monitor::with_id("M1", "Behind plaster", "L1", 0.5);
        let next = monitor.merged(&MonitorUpdate {
            position: Some(3.0),
            color: Some("#ff0000".to_string()),
            ..MonitorUpdate::default()
        });
        assert_eq!(next.position, 1.0);
        assert_eq!(next.color, "#ff0000");
        assert_eq!(next.name, "Behind plaster");
        assert!(next.variables.contains(&MonitorVariable::Temperature));
    }
}
