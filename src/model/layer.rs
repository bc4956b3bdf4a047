//! Assembly layers.
//!
//! Layers are ordered exterior to interior. Each owns a copy of its
//! material, never a reference into the catalog.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::material::Material;

/// One material slab of an assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    /// Unique identifier within the assembly.
    pub id: String,

    /// Material snapshot taken when the layer was created or reassigned.
    pub material: Material,

    /// Thickness in metres, always > 0.
    pub thickness: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Initial temperature in °C.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_temperature: Option<f64>,

    /// Initial relative humidity as a fraction (0-1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_humidity: Option<f64>,

    /// Number of numerical grid cells across the layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_cells: Option<u32>,
}

impl Layer {
    /// Create a layer with a generated id.
    pub fn new(material: Material, thickness: f64) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), material, thickness)
    }

    /// Create a layer with a specific id (for tests or import).
    pub fn with_id(id: impl Into<String>, material: Material, thickness: f64) -> Self {
        Self {
            id: id.into(),
            material,
            thickness,
            name: None,
            initial_temperature: None,
            initial_humidity: None,
            grid_cells: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name shown to users; falls back to the material name.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.material.name)
    }

    /// Thickness must be strictly positive and finite.
    pub fn is_valid_thickness(thickness: f64) -> bool {
        thickness.is_finite() && thickness > 0.0
    }

    /// Copy of this layer under a fresh id, named "<name> (Copy)".
    pub fn duplicate(&self) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: Some(format!("{} (Copy)", self.display_name())),
            ..self.clone()
        }
    }

    /// Return this layer with `update` merged in.
    pub fn merged(&self, update: &LayerUpdate) -> Self {
        let mut next = self.clone();
        if let Some(material) = &update.material {
            next.material = material.clone();
        }
        if let Some(thickness) = update.thickness {
            next.thickness = thickness;
        }
        if let Some(name) = &update.name {
            next.name = Some(name.clone());
        }
        if let Some(t) = update.initial_temperature {
            next.initial_temperature = Some(t);
        }
        if let Some(rh) = update.initial_humidity {
            next.initial_humidity = Some(rh);
        }
        if let Some(cells) = update.grid_cells {
            next.grid_cells = Some(cells);
        }
        next
    }
}

/// Partial update for a layer. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<Material>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_cells: Option<u32>,
}

impl LayerUpdate {
    pub fn thickness(thickness: f64) -> Self {
        Self {
            thickness: Some(thickness),
            ..Self::default()
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
