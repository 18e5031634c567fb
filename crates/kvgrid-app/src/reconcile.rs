//! Reconciliation: patch-vs-rebuild dispatch for inbound pushes.
//!
//! Given an incoming `(key, value)` pair, the reconciler either creates a new
//! card, overwrites the existing card's cells in place, or rebuilds the card's
//! structure - preserving which cell held focus across a rebuild when the same
//! row-major index still exists.

use kvgrid_core::prelude::*;
use kvgrid_core::Value;
use kvgrid_store::RawPair;

use crate::registry::{CellGrid, WidgetEntry, WidgetRegistry};
use crate::state::Focus;

/// What `upsert` did with an incoming pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Key was unknown; a card was created and inserted in sorted order.
    Created,
    /// Shape fingerprint unchanged; cells overwritten in place.
    PatchedInPlace,
    /// Shape fingerprint changed; card structure rebuilt from the value.
    Rebuilt,
}

/// Tallies for one applied batch, surfaced in the status line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub created: usize,
    pub patched: usize,
    pub rebuilt: usize,
    pub skipped: usize,
}

/// Reconcile one incoming `(key, value)` pair against the registry.
///
/// `focus` is the card-level focus shared with the navigation helper; it is
/// only touched when a rebuild hits the focused key.
pub fn upsert(
    registry: &mut WidgetRegistry,
    focus: &mut Option<Focus>,
    key: &str,
    value: &Value,
) -> UpsertOutcome {
    let shape = value.fingerprint();

    let Some(entry) = registry.get_mut(key) else {
        registry.insert_sorted(WidgetEntry::new(key, value));
        return UpsertOutcome::Created;
    };

    if shape == entry.last_shape {
        entry.grid.patch_in_place(value);
        return UpsertOutcome::PatchedInPlace;
    }

    // Shape changed: rebuild, carrying focus over by row-major index when
    // that index still exists in the new shape (no fallback otherwise).
    let focused_cell = match focus {
        Some(f) if f.key == key => Some(f.cell),
        _ => None,
    };

    entry.grid = CellGrid::from_value(value);
    entry.last_shape = shape;

    if let Some(cell) = focused_cell {
        if cell >= entry.grid.cell_count() {
            *focus = None;
        }
    }

    UpsertOutcome::Rebuilt
}

/// Apply one push batch in order, each pair's upsert completing before the
/// next begins. A pair whose value fails shape classification is skipped with
/// a diagnostic; the rest of the batch is unaffected.
pub fn apply_batch(
    registry: &mut WidgetRegistry,
    focus: &mut Option<Focus>,
    batch: &[RawPair],
) -> BatchStats {
    let mut stats = BatchStats::default();
    for pair in batch {
        match Value::classify(&pair.value) {
            Ok(value) => match upsert(registry, focus, &pair.key, &value) {
                UpsertOutcome::Created => stats.created += 1,
                UpsertOutcome::PatchedInPlace => stats.patched += 1,
                UpsertOutcome::Rebuilt => stats.rebuilt += 1,
            },
            Err(err) => {
                warn!("skipping pair for key {:?}: {}", pair.key, err);
                stats.skipped += 1;
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn matrix(rows: &[&[&str]]) -> Value {
        Value::Matrix(
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn robot_q_scenario() {
        let mut registry = WidgetRegistry::new();
        let mut focus = None;

        // First push creates a single-row card with two "0" cells.
        let outcome = upsert(
            &mut registry,
            &mut focus,
            "robot::q",
            &matrix(&[&["0", "0"]]),
        );
        assert_eq!(outcome, UpsertOutcome::Created);
        let entry = registry.get("robot::q").unwrap();
        assert_eq!(entry.grid.rows(), &[vec!["0".to_string(), "0".to_string()]]);
        assert_eq!(entry.last_shape.as_str(), "1,2");

        // Same fingerprint: patched in place, cell 0 becomes "1.5".
        let outcome = upsert(
            &mut registry,
            &mut focus,
            "robot::q",
            &matrix(&[&["1.5", "0"]]),
        );
        assert_eq!(outcome, UpsertOutcome::PatchedInPlace);
        assert_eq!(registry.get("robot::q").unwrap().grid.cell(0), Some("1.5"));

        // Fingerprint changes from "1,2" to "2,2": rebuilt.
        let outcome = upsert(
            &mut registry,
            &mut focus,
            "robot::q",
            &matrix(&[&["1.5", "0"], &["0", "0"]]),
        );
        assert_eq!(outcome, UpsertOutcome::Rebuilt);
        let entry = registry.get("robot::q").unwrap();
        assert_eq!(entry.last_shape.as_str(), "2,2");
        assert_eq!(entry.grid.cell_count(), 4);
    }

    #[test]
    fn idempotent_upsert_created_then_patched() {
        let mut registry = WidgetRegistry::new();
        let mut focus = None;
        let value = matrix(&[&["1", "2"], &["3"]]);

        assert_eq!(
            upsert(&mut registry, &mut focus, "k", &value),
            UpsertOutcome::Created
        );
        assert_eq!(
            upsert(&mut registry, &mut focus, "k", &value),
            UpsertOutcome::PatchedInPlace
        );
        assert_eq!(registry.get("k").unwrap().grid.collect(), value);
    }

    #[test]
    fn scalar_to_matrix_rebuilds() {
        let mut registry = WidgetRegistry::new();
        let mut focus = None;
        upsert(
            &mut registry,
            &mut focus,
            "k",
            &Value::Scalar("hello".into()),
        );
        let outcome = upsert(&mut registry, &mut focus, "k", &matrix(&[&["1"]]));
        assert_eq!(outcome, UpsertOutcome::Rebuilt);
    }

    #[test]
    fn rebuild_preserves_surviving_focus_index() {
        let mut registry = WidgetRegistry::new();
        let mut focus = Some(Focus {
            key: "k".into(),
            cell: 2,
        });
        upsert(&mut registry, &mut focus, "k", &matrix(&[&["0", "0", "0"]]));
        // New shape still has a row-major index 2.
        let outcome = upsert(
            &mut registry,
            &mut focus,
            "k",
            &matrix(&[&["1", "2"], &["3", "4"]]),
        );
        assert_eq!(outcome, UpsertOutcome::Rebuilt);
        assert_eq!(
            focus,
            Some(Focus {
                key: "k".into(),
                cell: 2
            })
        );
    }

    #[test]
    fn rebuild_drops_focus_when_index_gone() {
        let mut registry = WidgetRegistry::new();
        let mut focus = Some(Focus {
            key: "k".into(),
            cell: 3,
        });
        upsert(
            &mut registry,
            &mut focus,
            "k",
            &matrix(&[&["0", "0", "0", "0"]]),
        );
        let outcome = upsert(&mut registry, &mut focus, "k", &matrix(&[&["1", "2"]]));
        assert_eq!(outcome, UpsertOutcome::Rebuilt);
        assert_eq!(focus, None);
    }

    #[test]
    fn rebuild_leaves_other_keys_focus_alone() {
        let mut registry = WidgetRegistry::new();
        let mut focus = Some(Focus {
            key: "other".into(),
            cell: 0,
        });
        upsert(&mut registry, &mut focus, "other", &matrix(&[&["9"]]));
        upsert(&mut registry, &mut focus, "k", &matrix(&[&["0", "0"]]));
        upsert(&mut registry, &mut focus, "k", &matrix(&[&["1"]]));
        assert_eq!(
            focus,
            Some(Focus {
                key: "other".into(),
                cell: 0
            })
        );
    }

    #[test]
    fn batch_applies_in_order_and_skips_malformed() {
        let mut registry = WidgetRegistry::new();
        let mut focus = None;
        let batch = vec![
            RawPair {
                key: "b".into(),
                value: json!([["1"]]),
            },
            RawPair {
                key: "bad".into(),
                value: json!(42),
            },
            RawPair {
                key: "a".into(),
                value: json!("text"),
            },
        ];
        let stats = apply_batch(&mut registry, &mut focus, &batch);
        assert_eq!(stats.created, 2);
        assert_eq!(stats.skipped, 1);
        assert!(!registry.contains("bad"));
        assert_eq!(registry.ordered_keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
