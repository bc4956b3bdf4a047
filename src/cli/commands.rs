//! CLI Command Implementations
//!
//! Each command opens the session (restore), applies its actions to the
//! store and saves immediately.

use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::model::{Layer, LayerUpdate, MaterialCatalog, Monitor, ProjectUpdate};
use crate::state::{
    restore_autosave, Action, AutosaveManager, FileStorage, KeyValueStorage, PreferencesPersister,
    SaveOutcome, Store,
};

/// A store bound to its on-disk session.
pub struct Session {
    pub store: Store,
    storage: FileStorage,
    autosave: AutosaveManager,
    preferences: PreferencesPersister,
}

impl Session {
    /// Open the session directory named by `config` and restore it.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let storage = FileStorage::open(&config.storage_dir)?;
        let mut store = Store::with_config(config);
        let mut preferences = PreferencesPersister::new(config.preferences_key.clone());
        let mut autosave = AutosaveManager::new(&config.autosave);

        // An unreadable record must not lock the user out; `reset` replaces it.
        match restore_autosave(&mut store, &storage, autosave.key()) {
            Ok(Some(summary)) => info!(
                "Restored session saved at {}",
                summary.saved_at.format("%Y-%m-%d %H:%M:%S")
            ),
            Ok(None) => {}
            Err(e) => {
                warn!("Ignoring saved session '{}': {}", autosave.key(), e);
                if let Some(hint) = e.recovery_suggestion() {
                    warn!("{}", hint);
                }
            }
        }
        preferences.restore(&mut store, &storage)?;
        autosave.set_baseline(store.state());

        Ok(Self {
            store,
            storage,
            autosave,
            preferences,
        })
    }

    /// Delete the stored auto-save record.
    pub fn discard_saved(&mut self) -> Result<()> {
        self.storage.remove(self.autosave.key())
    }

    /// Persist the session now.
    pub fn save(&mut self) -> Result<()> {
        self.preferences.sync(&self.store, &mut self.storage)?;
        match self.autosave.save_now(self.store.state(), &mut self.storage) {
            SaveOutcome::Saved { bytes, .. } => info!("Session saved ({} bytes)", bytes),
            SaveOutcome::Unchanged => info!("Session unchanged"),
            SaveOutcome::Failed { message } => warn!("Session not saved: {}", message),
        }
        Ok(())
    }
}

/// Resolve a layer reference: a 1-based position or an id.
fn resolve_layer(store: &Store, reference: &str) -> String {
    if let Ok(position) = reference.parse::<usize>() {
        if position >= 1 && position <= store.layers().len() {
            return store.layers()[position - 1].id.clone();
        }
    }
    reference.to_string()
}

fn catalog_material(name: &str) -> Result<crate::model::Material> {
    MaterialCatalog::builtin()
        .get(name)
        .ok_or_else(|| StoreError::UnknownMaterial {
            name: name.to_string(),
        })
}

/// Print the assembly.
pub fn show(session: &Session) -> Result<()> {
    let store = &session.store;
    let project = store.project();
    let unit = store.display_settings().length_unit;

    println!(
        "Project: {}",
        if project.name.is_empty() { "(unnamed)" } else { project.name.as_str() }
    );
    println!(
        "Orientation: {} ({:.0}°), inclination {:.0}°",
        project.orientation.cardinal(),
        project.orientation.azimuth_deg,
        project.orientation.inclination_deg
    );
    println!("{:-<72}", "");
    println!("  exterior  h={:.1} W/m²K", store.surfaces().exterior.heat_transfer_coefficient);

    for (i, layer) in store.layers().iter().enumerate() {
        println!(
            "{:>3}. {:<28} {:>9.1} {:<3} λ={:<6.3} [{}]",
            i + 1,
            layer.display_name(),
            unit.from_metres(layer.thickness),
            unit.suffix(),
            layer.material.thermal_conductivity,
            layer.id
        );
        for monitor in store.monitors().iter().filter(|m| m.layer_id == layer.id) {
            println!("       ◦ {} @ {:.2} [{}]", monitor.name, monitor.position, monitor.id);
        }
    }

    println!("  interior  h={:.1} W/m²K", store.surfaces().interior.heat_transfer_coefficient);
    println!("{:-<72}", "");
    println!(
        "Total thickness: {:.1} {}",
        unit.from_metres(store.total_thickness()),
        unit.suffix()
    );

    let dangling = store.dangling_monitors();
    if !dangling.is_empty() {
        println!("Monitors without a layer: {}", dangling.len());
    }

    Ok(())
}

/// List the built-in material catalog.
pub fn materials() -> Result<()> {
    println!(
        "{:<20} {:<12} {:>8} {:>8} {:>8}",
        "Name", "Category", "λ", "ρ", "μ"
    );
    for material in MaterialCatalog::builtin().iter() {
        println!(
            "{:<20} {:<12} {:>8.3} {:>8.0} {:>8.1}",
            material.name,
            material.category.as_deref().unwrap_or("-"),
            material.thermal_conductivity,
            material.bulk_density,
            material.vapor_resistance_factor
        );
    }
    Ok(())
}

pub fn add_layer(session: &mut Session, material: &str, thickness: f64, name: Option<String>) -> Result<()> {
    let mut layer = Layer::new(catalog_material(material)?, thickness);
    layer.name = name;
    let id = layer.id.clone();
    session.store.add_layer(layer);

    match session.store.layer(&id) {
        Some(layer) => println!("Added layer: {} [{}]", layer.display_name(), id),
        None => println!("Layer not added (thickness must be > 0)"),
    }
    session.save()
}

pub fn update_layer(
    session: &mut Session,
    reference: &str,
    thickness: Option<f64>,
    name: Option<String>,
    material: Option<String>,
) -> Result<()> {
    let id = resolve_layer(&session.store, reference);
    let updates = LayerUpdate {
        thickness,
        name,
        material: material.as_deref().map(catalog_material).transpose()?,
        ..LayerUpdate::default()
    };
    let revision = session.store.revision();
    session.store.update_layer(&id, updates);
    report(&session.store, revision, "Layer updated");
    session.save()
}

pub fn delete_layer(session: &mut Session, reference: &str) -> Result<()> {
    let id = resolve_layer(&session.store, reference);
    let revision = session.store.revision();
    session.store.delete_layer(&id);
    report(&session.store, revision, "Layer deleted");
    session.save()
}

pub fn move_layer(session: &mut Session, from: usize, to: usize) -> Result<()> {
    let revision = session.store.revision();
    session
        .store
        .reorder_layers(from.saturating_sub(1), to.saturating_sub(1));
    report(&session.store, revision, "Layer moved");
    session.save()
}

pub fn duplicate_layer(session: &mut Session, reference: &str) -> Result<()> {
    let id = resolve_layer(&session.store, reference);
    let revision = session.store.revision();
    session.store.duplicate_layer(&id);
    report(&session.store, revision, "Layer duplicated");
    session.save()
}

pub fn add_monitor(session: &mut Session, reference: &str, position: f64, name: &str) -> Result<()> {
    let layer_id = resolve_layer(&session.store, reference);
    let monitor = Monitor::new(name, layer_id, position);
    let id = monitor.id.clone();
    let revision = session.store.revision();
    session.store.add_monitor(monitor);
    report(&session.store, revision, &format!("Monitor added [{}]", id));
    session.save()
}

pub fn delete_monitor(session: &mut Session, id: &str) -> Result<()> {
    let revision = session.store.revision();
    session.store.delete_monitor(id);
    report(&session.store, revision, "Monitor deleted");
    session.save()
}

pub fn set_project(session: &mut Session, updates: ProjectUpdate) -> Result<()> {
    session.store.update_project(updates);
    println!("Project: {}", session.store.project().name);
    session.save()
}

/// Apply every action in a JSON script, then save once.
pub fn replay(session: &mut Session, script: &Path) -> Result<()> {
    let content = fs::read_to_string(script).map_err(|e| StoreError::StorageRead {
        path: script.to_path_buf(),
        source: e,
    })?;
    let actions: Vec<Action> = serde_json::from_str(&content)?;
    info!("Replaying {} actions from {}", actions.len(), script.display());

    for action in actions {
        let name = action.name();
        let revision = session.store.revision();
        session.store.dispatch(action);
        if session.store.revision() == revision {
            println!("  {:<22} (no change)", name);
        } else {
            println!("  {:<22} ok", name);
        }
    }
    println!(
        "Undo: {} | Redo: {}",
        session.store.history().past_len(),
        session.store.history().future_len()
    );
    session.save()
}

pub fn reset(session: &mut Session) -> Result<()> {
    session.store.reset_assembly();
    session.discard_saved()?;
    println!("Assembly cleared");
    session.save()
}

fn report(store: &Store, revision_before: u64, message: &str) {
    if store.revision() == revision_before {
        println!("Nothing changed");
    } else {
        println!("{}", message);
    }
}
