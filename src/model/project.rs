//! Project metadata: flat configuration with no lifecycle of its own.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Descriptive and calculation settings of a project.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectInfo {
    pub name: String,
    pub client: String,
    pub project_number: String,
    pub description: String,
    pub orientation: Orientation,
    pub calculation_period: CalculationPeriod,
    pub advanced: AdvancedSettings,
}

impl ProjectInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn merged(&self, update: &ProjectUpdate) -> Self {
        let mut next = self.clone();
        if let Some(name) = &update.name {
            next.name = name.clone();
        }
        if let Some(client) = &update.client {
            next.client = client.clone();
        }
        if let Some(number) = &update.project_number {
            next.project_number = number.clone();
        }
        if let Some(description) = &update.description {
            next.description = description.clone();
        }
        next
    }
}

/// Partial update of the descriptive project fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Facing direction and tilt of the assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Orientation {
    /// Degrees clockwise from north.
    pub azimuth_deg: f64,
    /// Degrees from horizontal; 90 is a vertical wall.
    pub inclination_deg: f64,
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            azimuth_deg: 0.0,
            inclination_deg: 90.0,
        }
    }
}

impl Orientation {
    /// Compass label for the azimuth.
    pub fn cardinal(&self) -> &'static str {
        const LABELS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
        let normalized = self.azimuth_deg.rem_euclid(360.0);
        let sector = ((normalized + 22.5) / 45.0) as usize % 8;
        LABELS[sector]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub time_step_hours: f64,
}

impl Default for CalculationPeriod {
    fn default() -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap_or_default();
        let end = NaiveDate::from_ymd_opt(2027, 10, 1).unwrap_or_default();
        Self {
            start,
            end,
            time_step_hours: 1.0,
        }
    }
}

impl CalculationPeriod {
    /// Whole days covered; zero when the range is inverted.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days().max(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedSettings {
    pub adaptive_time_step: bool,
    pub max_iterations: u32,
    pub convergence_tolerance: f64,
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            adaptive_time_step: true,
            max_iterations: 100,
            convergence_tolerance: 1e-4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinal_directions() {
        let at = |azimuth_deg| Orientation {
            azimuth_deg,
            inclination_deg: 90.0,
        };
        assert_eq!(at(0.0).cardinal(), "N");
        assert_eq!(at(180.0).cardinal(), "S");
        assert_eq!(at(350.0).cardinal(), "N");
        assert_eq!(at(-90.0).cardinal(), "W");
        assert_eq!(at(130.0).cardinal(), "SE");
    }

    #[test]
    fn test_period_days() {
        let period = CalculationPeriod::default();
        assert_eq!(period.days(), 1095);
        let inverted = CalculationPeriod {
            start: period.end,
            end: period.start,
            time_step_hours: 1.0,
        };
        assert_eq!(inverted.days(), 0);
    }

    #[test]
    fn test_project_deserializes_with_missing_fields() {
        let info: ProjectInfo = serde_json::from_str(r#"{"name": "Villa"}"#).unwrap();
        assert_eq!(info.name, "Villa");
        assert_eq!(info.orientation, Orientation::default());
    }
}
