//! Store Integration Tests
//!
//! Invariants, undo/redo laws and the reference scenarios for the
//! assembly store.

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;

use layerstack::model::{Layer, LayerUpdate, Material, Monitor, MonitorUpdate};
use layerstack::state::{HistoryOp, Slice};
use layerstack::Store;

fn brick() -> Material {
    Material::new("Solid Brick", 0.6, 1900.0, 0.24, 850.0, 10.0)
}

fn layer(id: &str, thickness: f64) -> Layer {
    Layer::with_id(id, brick(), thickness)
}

fn ids(store: &Store) -> Vec<String> {
    store.layers().iter().map(|l| l.id.clone()).collect()
}

fn sum_of_layers(store: &Store) -> f64 {
    store.layers().iter().map(|l| l.thickness).sum()
}

/// Small deterministic generator so sequences are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n.max(1) as u64) as usize
    }
}

/// Apply one random mutating action. Returns a label for failure messages.
fn random_action(store: &mut Store, rng: &mut Lcg, counter: &mut usize) -> String {
    let len = store.layers().len();
    match rng.below(5) {
        0 => {
            *counter += 1;
            let thickness = 0.01 * (1 + rng.below(30)) as f64;
            store.add_layer(layer(&format!("R{}", counter), thickness));
            format!("add R{}", counter)
        }
        1 if len > 0 => {
            let id = store.layers()[rng.below(len)].id.clone();
            store.delete_layer(&id);
            format!("delete {}", id)
        }
        2 if len > 0 => {
            let id = store.layers()[rng.below(len)].id.clone();
            let thickness = 0.005 * (1 + rng.below(40)) as f64;
            store.update_layer(&id, LayerUpdate::thickness(thickness));
            format!("update {} -> {}", id, thickness)
        }
        3 if len > 1 => {
            let (from, to) = (rng.below(len), rng.below(len));
            store.reorder_layers(from, to);
            format!("reorder {} -> {}", from, to)
        }
        _ if len > 0 => {
            let id = store.layers()[rng.below(len)].id.clone();
            store.duplicate_layer(&id);
            format!("duplicate {}", id)
        }
        _ => "skip".to_string(),
    }
}

// === Invariants ===

#[test]
fn test_total_thickness_tracks_layers() {
    let mut store = Store::new();
    let mut rng = Lcg(7);
    let mut counter = 0;
    for step in 0..300 {
        let label = random_action(&mut store, &mut rng, &mut counter);
        assert_relative_eq!(
            store.total_thickness(),
            sum_of_layers(&store),
            epsilon = 1e-12
        );
        if step % 7 == 0 {
            store.undo();
            assert_relative_eq!(store.total_thickness(), sum_of_layers(&store), epsilon = 1e-12);
        }
        if step % 11 == 0 {
            store.redo();
            assert_relative_eq!(store.total_thickness(), sum_of_layers(&store), epsilon = 1e-12);
        }
        assert!(store.total_thickness() >= 0.0, "after {}", label);
    }
}

#[test]
fn test_layer_ids_stay_unique() {
    let mut store = Store::new();
    let mut rng = Lcg(42);
    let mut counter = 0;
    for _ in 0..300 {
        let label = random_action(&mut store, &mut rng, &mut counter);
        let mut seen = ids(&store);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), store.layers().len(), "after {}", label);
    }
}

#[test]
fn test_reorder_preserves_multiset() {
    let mut store = Store::new();
    for i in 0..6 {
        store.add_layer(layer(&format!("L{}", i), 0.1));
    }
    let mut expected = ids(&store);
    expected.sort();

    let mut rng = Lcg(3);
    for _ in 0..50 {
        store.reorder_layers(rng.below(6), rng.below(6));
        let mut now = ids(&store);
        now.sort();
        assert_eq!(now, expected);
    }
}

// === Round-trip law ===

#[test]
fn test_undo_then_redo_round_trips_every_action() {
    let mut store = Store::new();
    let mut rng = Lcg(99);
    let mut counter = 0;

    for _ in 0..200 {
        let before_layers = store.layers().to_vec();
        let before_total = store.total_thickness();
        let newest_before = store.history().peek_undo().map(|e| e.id.clone());

        let label = random_action(&mut store, &mut rng, &mut counter);
        let newest_after = store.history().peek_undo().map(|e| e.id.clone());
        if newest_after == newest_before {
            // Rejected or no-op: nothing was recorded.
            continue;
        }
        let after_layers = store.layers().to_vec();
        let after_total = store.total_thickness();

        store.undo();
        assert_eq!(store.layers(), before_layers.as_slice(), "undo of {}", label);
        assert_eq!(store.total_thickness().to_bits(), before_total.to_bits(), "undo of {}", label);

        store.redo();
        assert_eq!(store.layers(), after_layers.as_slice(), "redo of {}", label);
        assert_eq!(store.total_thickness().to_bits(), after_total.to_bits(), "redo of {}", label);
    }
}

#[test]
fn test_monitor_add_delete_round_trip() {
    let mut store = Store::new();
    store.add_layer(layer("L1", 0.2));
    store.add_monitor(Monitor::with_id("M1", "a", "L1", 0.1));
    store.add_monitor(Monitor::with_id("M2", "b", "L1", 0.9));

    let before = store.monitors().to_vec();
    store.delete_monitor("M1");
    store.undo();
    assert_eq!(store.monitors(), before.as_slice());
    store.redo();
    assert_eq!(store.monitors().len(), 1);
    assert_eq!(store.monitors()[0].id, "M2");

    store.undo();
    store.undo();
    assert_eq!(store.monitors().len(), 1);
    store.redo();
    assert_eq!(store.monitors(), before.as_slice());
}

// === No-op idempotence ===

#[test]
fn test_noops_leave_state_unchanged() {
    let mut store = Store::new();
    store.undo();
    store.redo();
    assert_eq!(store.revision(), 0);

    store.add_layer(layer("L1", 0.1));
    let snapshot = store.snapshot();
    let revision = store.revision();

    store.redo();
    store.update_layer("missing", LayerUpdate::thickness(0.5));
    store.delete_layer("missing");
    store.duplicate_layer("missing");
    store.update_monitor("missing", MonitorUpdate::default());
    store.delete_monitor("missing");

    assert_eq!(store.revision(), revision);
    assert_eq!(store.layers(), snapshot.layers.as_slice());
    assert_eq!(store.history().past_len(), 1);
}

// === History bound and branch invalidation ===

#[test]
fn test_history_is_bounded_fifo() {
    let mut store = Store::new();
    for i in 0..25 {
        store.add_layer(layer(&format!("L{}", i), 0.01));
    }
    assert_eq!(store.history().past_len(), 20);
    assert_eq!(store.history().max_steps(), 20);

    let oldest = store.history().past().next().unwrap();
    match &oldest.op {
        HistoryOp::AddLayer { layer } => assert_eq!(layer.id, "L5"),
        other => panic!("unexpected op {:?}", other),
    }

    for _ in 0..30 {
        store.undo();
    }
    assert_eq!(ids(&store), vec!["L0", "L1", "L2", "L3", "L4"]);
}

#[test]
fn test_new_action_discards_redo_branch() {
    let mut store = Store::new();
    store.add_layer(layer("L1", 0.1));
    store.add_layer(layer("L2", 0.1));
    store.undo();
    assert!(store.can_redo());

    store.add_layer(layer("L3", 0.1));
    assert!(!store.can_redo());
    assert_eq!(store.history().future_len(), 0);
    store.redo();
    assert_eq!(ids(&store), vec!["L1", "L3"]);
}

// === Reference scenarios ===

#[test]
fn test_scenario_add_undo_redo() {
    let mut store = Store::new();
    store.add_layer(layer("L1", 0.1));
    assert_eq!(store.total_thickness(), 0.1);

    store.undo();
    assert_eq!(store.total_thickness(), 0.0);
    assert!(store.layers().is_empty());
    assert!(store.can_redo());

    store.redo();
    assert_eq!(store.total_thickness(), 0.1);
    assert!(store.layer("L1").is_some());
}

#[test]
fn test_scenario_reorder_two_layers() {
    let mut store = Store::new();
    store.add_layer(layer("L1", 0.1));
    store.add_layer(layer("L2", 0.2));

    store.reorder_layers(0, 1);
    assert_eq!(ids(&store), vec!["L2", "L1"]);
    assert_relative_eq!(store.total_thickness(), 0.3, epsilon = 1e-12);

    store.undo();
    assert_eq!(ids(&store), vec!["L1", "L2"]);
}

#[test]
fn test_scenario_delete_first_of_three() {
    let mut store = Store::new();
    store.add_layer(layer("L1", 0.1));
    store.add_layer(layer("L2", 0.2));
    store.add_layer(layer("L3", 0.3));
    let total = store.total_thickness();

    store.delete_layer("L1");
    assert_eq!(ids(&store), vec!["L2", "L3"]);
    assert_relative_eq!(store.total_thickness(), total - 0.1, epsilon = 1e-12);

    store.undo();
    assert_eq!(ids(&store), vec!["L1", "L2", "L3"]);
    assert_eq!(store.total_thickness().to_bits(), total.to_bits());
}

#[test]
fn test_scenario_repeated_updates_exceed_limit() {
    let mut store = Store::new();
    store.add_layer(layer("Lx", 0.1));
    for _ in 0..21 {
        store.update_layer("Lx", LayerUpdate::thickness(0.5));
    }
    assert_eq!(store.history().past_len(), 20);
    assert!(store
        .history()
        .past()
        .all(|e| matches!(e.op, HistoryOp::UpdateLayer { .. })));

    // Twenty undos reach the first update's result, never its input.
    for _ in 0..25 {
        store.undo();
    }
    assert_eq!(store.layer("Lx").unwrap().thickness, 0.5);
}

#[test]
fn test_scenario_duplicate_appends_copy() {
    let mut store = Store::new();
    store.add_layer(layer("L1", 0.1).named("Outer leaf"));
    store.add_layer(layer("L2", 0.2));
    let original = store.layer("L1").unwrap().clone();

    store.duplicate_layer("L1");
    let copy = store.layers().last().unwrap();
    assert_eq!(store.layers().len(), 3);
    assert_ne!(copy.id, "L1");
    assert_eq!(copy.name.as_deref(), Some("Outer leaf (Copy)"));
    assert_eq!(store.layer("L1").unwrap(), &original);
    assert_relative_eq!(store.total_thickness(), 0.4, epsilon = 1e-12);

    store.undo();
    assert_eq!(ids(&store), vec!["L1", "L2"]);
}

#[test]
fn test_scenario_update_monitor_is_not_undoable() {
    // Known gap: monitor edits bypass history while add/delete are recorded.
    let mut store = Store::new();
    store.add_layer(layer("L1", 0.2));
    store.add_monitor(Monitor::with_id("M1", "Core", "L1", 0.5));
    let past = store.history().past_len();

    store.update_monitor(
        "M1",
        MonitorUpdate {
            name: Some("Renamed".to_string()),
            ..MonitorUpdate::default()
        },
    );
    assert_eq!(store.history().past_len(), past);

    // Undo reverts the add instead of the rename.
    store.undo();
    assert!(store.monitor("M1").is_none());
    store.redo();
    assert_eq!(store.monitor("M1").unwrap().name, "Core");
}

// === Subscriptions ===

#[test]
fn test_history_slice_reports_availability_changes() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let mut store = Store::new();
    let changes = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&changes);
    store.subscribe(&[Slice::History], move |_| *sink.borrow_mut() += 1);

    store.add_layer(layer("L1", 0.1)); // can_undo false -> true
    store.add_layer(layer("L2", 0.1)); // no availability change
    store.undo(); // can_redo false -> true
    assert_eq!(*changes.borrow(), 2);
}
