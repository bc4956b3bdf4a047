//! Domain entities of an assembly project.

pub mod climate;
pub mod layer;
pub mod material;
pub mod monitor;
pub mod project;
pub mod surface;
pub mod ui;

pub use climate::{ClimateSelection, ClimateSource};
pub use layer::{Layer, LayerUpdate};
pub use material::{Material, MaterialCatalog};
pub use monitor::{Monitor, MonitorUpdate, MonitorVariable};
pub use project::{AdvancedSettings, CalculationPeriod, Orientation, ProjectInfo, ProjectUpdate};
pub use surface::{Surface, SurfaceSide, SurfaceUpdate, Surfaces};
pub use ui::{DisplaySettings, LengthUnit, SimulationStatus, Theme, UiPreferences};
