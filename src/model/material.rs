//! Materials and the built-in material catalog.
//!
//! A `Material` is a plain value. Layers hold their own copy, so editing a
//! layer's material never reaches back into the catalog it came from.

use serde::{Deserialize, Serialize};

/// Thermal and hygrothermal properties of a building material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// Display name.
    pub name: String,

    /// Thermal conductivity in W/(m·K).
    pub thermal_conductivity: f64,

    /// Bulk density in kg/m³.
    pub bulk_density: f64,

    /// Porosity in m³/m³.
    pub porosity: f64,

    /// Specific heat capacity in J/(kg·K).
    pub heat_capacity: f64,

    /// Water vapour diffusion resistance factor (μ, dimensionless).
    pub vapor_resistance_factor: f64,

    /// Catalog grouping such as "Masonry" or "Insulation".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Material {
    pub fn new(
        name: impl Into<String>,
        thermal_conductivity: f64,
        bulk_density: f64,
        porosity: f64,
        heat_capacity: f64,
        vapor_resistance_factor: f64,
    ) -> Self {
        Self {
            name: name.into(),
            thermal_conductivity,
            bulk_density,
            porosity,
            heat_capacity,
            vapor_resistance_factor,
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Thermal resistance of a slab of this material in m²·K/W.
    pub fn thermal_resistance(&self, thickness: f64) -> f64 {
        if self.thermal_conductivity <= 0.0 {
            return 0.0;
        }
        thickness / self.thermal_conductivity
    }

    /// Equivalent air-layer thickness (sd-value) of a slab in metres.
    pub fn sd_value(&self, thickness: f64) -> f64 {
        self.vapor_resistance_factor * thickness
    }
}

/// Read-only set of materials layers are copied from.
#[derive(Debug, Clone, Default)]
pub struct MaterialCatalog {
    materials: Vec<Material>,
}

impl MaterialCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self {
            materials: Vec::new(),
        }
    }

    /// Catalog preloaded with common envelope materials.
    pub fn builtin() -> Self {
        let materials = vec![
            Material::new("Solid Brick", 0.60, 1900.0, 0.24, 850.0, 10.0).with_category("Masonry"),
            Material::new("Concrete C35/45", 1.60, 2220.0, 0.18, 850.0, 92.0)
                .with_category("Concrete"),
            Material::new("Aerated Concrete", 0.12, 600.0, 0.72, 850.0, 8.3)
                .with_category("Masonry"),
            Material::new("Mineral Wool", 0.04, 60.0, 0.95, 850.0, 1.3)
                .with_category("Insulation"),
            Material::new("EPS", 0.04, 15.0, 0.95, 1500.0, 50.0).with_category("Insulation"),
            Material::new("Wood Fibre Board", 0.05, 155.0, 0.90, 1400.0, 3.0)
                .with_category("Insulation"),
            Material::new("Gypsum Board", 0.20, 850.0, 0.65, 870.0, 8.3)
                .with_category("Boards"),
            Material::new("Lime Plaster", 0.70, 1600.0, 0.30, 850.0, 7.0)
                .with_category("Plasters"),
            Material::new("Spruce", 0.09, 455.0, 0.73, 1500.0, 130.0).with_category("Timber"),
        ];
        Self { materials }
    }

    /// Register a material, replacing any entry with the same name.
    pub fn insert(&mut self, material: Material) {
        match self
            .materials
            .iter_mut()
            .find(|m| m.name.eq_ignore_ascii_case(&material.name))
        {
            Some(existing) => *existing = material,
            None => self.materials.push(material),
        }
    }

    /// Look up by case-insensitive name and return an owned snapshot.
    pub fn get(&self, name: &str) -> Option<Material> {
        self.materials
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = MaterialCatalog::builtin();
        let wool = catalog.get("mineral wool").unwrap();
        assert_eq!(wool.name, "Mineral Wool");
        assert!(catalog.get("unobtainium").is_none());
    }

    #[test]
    fn test_get_returns_independent_copy() {
        let catalog = MaterialCatalog::builtin();
        let mut brick = catalog.get("Solid Brick").unwrap();
        brick.thermal_conductivity = 99.0;
        assert_relative_eq!(
            catalog.get("Solid Brick").unwrap().thermal_conductivity,
            0.60
        );
    }

    #[test]
    fn test_insert_replaces_by_name() {
        let mut catalog = MaterialCatalog::new();
        catalog.insert(Material::new("Clay", 0.9, 1500.0, 0.3, 1000.0, 8.0));
        catalog.insert(Material::new("clay", 0.8, 1500.0, 0.3, 1000.0, 8.0));
        assert_eq!(catalog.len(), 1);
        assert_relative_eq!(catalog.get("CLAY").unwrap().thermal_conductivity, 0.8);
    }

    #[test]
    fn test_resistance_and_sd_value() {
        let wool = Material::new("Wool", 0.04, 60.0, 0.95, 850.0, 1.3);
        assert_relative_eq!(wool.thermal_resistance(0.2), 5.0, epsilon = 1e-12);
        assert_relative_eq!(wool.sd_value(0.2), 0.26, epsilon = 1e-12);
    }
}
