//! Exterior and interior boundary surfaces.

use serde::{Deserialize, Deserializer, Serialize};

/// Which face of the assembly a surface belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceSide {
    Exterior,
    Interior,
}

impl std::fmt::Display for SurfaceSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceSide::Exterior => write!(f, "exterior"),
            SurfaceSide::Interior => write!(f, "interior"),
        }
    }
}

/// Transfer coefficients of one boundary surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Surface {
    /// Total heat transfer coefficient in W/(m²·K).
    pub heat_transfer_coefficient: f64,

    /// Short-wave radiation absorptivity (0-1).
    pub short_wave_absorptivity: f64,

    /// Long-wave radiation emissivity (0-1).
    pub long_wave_emissivity: f64,

    /// Vapour diffusion thickness of a surface coating in metres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sd_value: Option<f64>,

    /// Fraction of driving rain absorbed (exterior only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain_absorption_factor: Option<f64>,
}

impl Surface {
    /// Typical exterior wall surface (EN ISO 6946 values).
    pub fn exterior_default() -> Self {
        Self {
            heat_transfer_coefficient: 17.0,
            short_wave_absorptivity: 0.4,
            long_wave_emissivity: 0.9,
            sd_value: None,
            rain_absorption_factor: Some(0.7),
        }
    }

    /// Typical interior wall surface.
    pub fn interior_default() -> Self {
        Self {
            heat_transfer_coefficient: 8.0,
            short_wave_absorptivity: 0.0,
            long_wave_emissivity: 0.9,
            sd_value: None,
            rain_absorption_factor: None,
        }
    }

    pub fn merged(&self, update: &SurfaceUpdate) -> Self {
        let mut next = self.clone();
        if let Some(h) = update.heat_transfer_coefficient {
            next.heat_transfer_coefficient = h;
        }
        if let Some(a) = update.short_wave_absorptivity {
            next.short_wave_absorptivity = a;
        }
        if let Some(e) = update.long_wave_emissivity {
            next.long_wave_emissivity = e;
        }
        if let Some(sd) = update.sd_value {
            next.sd_value = sd;
        }
        if let Some(rain) = update.rain_absorption_factor {
            next.rain_absorption_factor = rain;
        }
        next
    }
}

/// Partial update for a surface.
///
/// The optional parameters take `Some(None)` to clear them; in JSON that is
/// an explicit `null`, while an absent field leaves the value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat_transfer_coefficient: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_wave_absorptivity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_wave_emissivity: Option<f64>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub sd_value: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub rain_absorption_factor: Option<Option<f64>>,
}

/// A field that is present in the input, possibly as `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

impl From<&Surface> for SurfaceUpdate {
    fn from(surface: &Surface) -> Self {
        Self {
            heat_transfer_coefficient: Some(surface.heat_transfer_coefficient),
            short_wave_absorptivity: Some(surface.short_wave_absorptivity),
            long_wave_emissivity: Some(surface.long_wave_emissivity),
            sd_value: Some(surface.sd_value),
            rain_absorption_factor: Some(surface.rain_absorption_factor),
        }
    }
}

/// The fixed pair of surfaces bounding an assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surfaces {
    pub exterior: Surface,
    pub interior: Surface,
}

impl Default for Surfaces {
    fn default() -> Self {
        Self {
            exterior: Surface::exterior_default(),
            interior: Surface::interior_default(),
        }
    }
}

impl Surfaces {
    pub fn get(&self, side: SurfaceSide) -> &Surface {
        match side {
            SurfaceSide::Exterior => &self.exterior,
            SurfaceSide::Interior => &self.interior,
        }
    }

    pub fn get_mut(&mut self, side: SurfaceSide) -> &mut Surface {
        match side {
            SurfaceSide::Exterior => &mut self.exterior,
            SurfaceSide::Interior => &mut self.interior,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_unset_fields() {
        let surface = Surface::exterior_default();
        let next = surface.merged(&SurfaceUpdate {
            short_wave_absorptivity: Some(0.8),
            ..SurfaceUpdate::default()
        });
        assert_eq!(next.short_wave_absorptivity, 0.8);
        assert_eq!(next.heat_transfer_coefficient, 17.0);
        assert_eq!(next.rain_absorption_factor, Some(0.7));
    }

    #[test]
    fn test_full_update_reproduces_surface() {
        let mut surface = Surface::interior_default();
        surface.sd_value = Some(0.5);
        let rebuilt = Surface::exterior_default().merged(&SurfaceUpdate::from(&surface));
        assert_eq!(rebuilt, surface);
        assert_eq!(rebuilt.rain_absorption_factor, None);
    }

    #[test]
    fn test_null_clears_optional_parameters() {
        let mut surface = Surface::exterior_default();
        surface.sd_value = Some(0.5);

        let clear: SurfaceUpdate =
            serde_json::from_str(r#"{"sdValue": null, "rainAbsorptionFactor": null}"#).unwrap();
        assert_eq!(clear.sd_value, Some(None));
        let cleared = surface.merged(&clear);
        assert_eq!(cleared.sd_value, None);
        assert_eq!(cleared.rain_absorption_factor, None);

        let absent: SurfaceUpdate = serde_json::from_str(r#"{"sdValue": 1.5}"#).unwrap();
        assert_eq!(absent.rain_absorption_factor, None);
        let kept = surface.merged(&absent);
        assert_eq!(kept.sd_value, Some(1.5));
        assert_eq!(kept.rain_absorption_factor, Some(0.7));
    }

    #[test]
    fn test_cleared_field_serializes_as_null() {
        let update = SurfaceUpdate {
            sd_value: Some(None),
            ..SurfaceUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"sdValue": null}));
    }

    #[test]
    fn test_side_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SurfaceSide::Exterior).unwrap(),
            "\"exterior\""
        );
        assert_eq!(SurfaceSide::Interior.to_string(), "interior");
    }
}
