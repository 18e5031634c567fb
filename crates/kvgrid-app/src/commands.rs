//! Command handlers: the four edit operations over a card.
//!
//! Each handler derives a value from the card's collected state (or from the
//! toggle snapshot) and produces a [`CommandEffect`] for the event loop to
//! execute. Handlers are wired through an explicit dispatch table rather than
//! ad hoc to input events, keeping them independent of the UI layer.
//!
//! The toggle is a per-key two-state machine: `Normal` (no snapshot held) and
//! `Toggled` (snapshot held, card displays a zero fill). Only the Toggle
//! command transitions between them; Submit in particular leaves the snapshot
//! alone.

use kvgrid_core::prelude::*;
use kvgrid_core::{format_number, parse_numeric, Value};

use crate::registry::WidgetRegistry;

/// The four user-invocable edit operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Send the card's current (normalized) value to the store.
    Submit,
    /// Fill every cell with the first cell's numeric value and send.
    Repeat,
    /// Swap between the current value and a zero fill (snapshot-backed).
    Toggle,
    /// Flatten the card's current value to the system clipboard.
    Copy,
}

/// What the event loop should do with a command's result.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandEffect {
    /// Hand a serialized `(key, value)` update to the outbound sender.
    Send {
        key: String,
        value: serde_json::Value,
    },
    /// Write a flattened rendering to the system clipboard.
    CopyText(String),
}

type Handler = fn(&mut WidgetRegistry, &str) -> Result<Option<CommandEffect>>;

/// Dispatch table from command to handler.
const DISPATCH: &[(Command, Handler)] = &[
    (Command::Submit, handle_submit),
    (Command::Repeat, handle_repeat),
    (Command::Toggle, handle_toggle),
    (Command::Copy, handle_copy),
];

/// Run `command` against the card for `key`.
///
/// Returns `Ok(None)` when the key has no card (nothing to act on).
///
/// # Errors
///
/// [`Error::UnparseableRepeat`] when Repeat is invoked on a non-numeric or
/// whitespace-containing first cell. The caller logs it; no send happens and
/// no state changes.
pub fn dispatch(
    registry: &mut WidgetRegistry,
    key: &str,
    command: Command,
) -> Result<Option<CommandEffect>> {
    let handler = DISPATCH
        .iter()
        .find(|(cmd, _)| *cmd == command)
        .map(|(_, handler)| *handler)
        .expect("every command has a handler");
    handler(registry, key)
}

fn handle_submit(registry: &mut WidgetRegistry, key: &str) -> Result<Option<CommandEffect>> {
    let Some(entry) = registry.get(key) else {
        return Ok(None);
    };
    let value = entry.grid.collect().normalized();
    Ok(Some(CommandEffect::Send {
        key: key.to_string(),
        value: value.serialize(),
    }))
}

fn handle_repeat(registry: &mut WidgetRegistry, key: &str) -> Result<Option<CommandEffect>> {
    let Some(entry) = registry.get(key) else {
        return Ok(None);
    };
    let collected = entry.grid.collect();
    let first = collected.cell_at(0).unwrap_or("");
    let num =
        parse_numeric(first).ok_or_else(|| Error::unparseable_repeat(first.to_string()))?;
    let filled = collected.filled_with(&format_number(num));
    Ok(Some(CommandEffect::Send {
        key: key.to_string(),
        value: filled.serialize(),
    }))
}

fn handle_toggle(registry: &mut WidgetRegistry, key: &str) -> Result<Option<CommandEffect>> {
    if !registry.contains(key) {
        return Ok(None);
    }

    // Toggled -> Normal: send the stored value back and clear it.
    if let Some(snapshot) = registry.clear_snapshot(key) {
        return Ok(Some(CommandEffect::Send {
            key: key.to_string(),
            value: snapshot.serialize(),
        }));
    }

    // Normal -> Toggled: snapshot the current value, send a zero fill of the
    // same shape. A scalar that is already exactly "0" fills with "1" instead
    // so the toggle is never a no-op send; matrices always fill with "0".
    let entry = registry.get(key).expect("checked above");
    let collected = entry.grid.collect().normalized();
    let fill = match &collected {
        Value::Scalar(text) if text == "0" => "1",
        _ => "0",
    };
    let sent = collected.filled_with(fill);
    registry.set_snapshot(key, collected);
    Ok(Some(CommandEffect::Send {
        key: key.to_string(),
        value: sent.serialize(),
    }))
}

fn handle_copy(registry: &mut WidgetRegistry, key: &str) -> Result<Option<CommandEffect>> {
    let Some(entry) = registry.get(key) else {
        return Ok(None);
    };
    Ok(Some(CommandEffect::CopyText(entry.grid.collect().flatten())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::WidgetEntry;
    use serde_json::json;

    fn matrix(rows: &[&[&str]]) -> Value {
        Value::Matrix(
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn registry_with(key: &str, value: &Value) -> WidgetRegistry {
        let mut registry = WidgetRegistry::new();
        registry.insert_sorted(WidgetEntry::new(key, value));
        registry
    }

    fn sent_value(effect: Option<CommandEffect>) -> serde_json::Value {
        match effect {
            Some(CommandEffect::Send { value, .. }) => value,
            other => panic!("expected Send effect, got {other:?}"),
        }
    }

    #[test]
    fn submit_normalizes_numeric_cells() {
        let mut registry = registry_with("k", &matrix(&[&["3.0", "abc", "0.50"]]));
        let effect = dispatch(&mut registry, "k", Command::Submit).unwrap();
        assert_eq!(sent_value(effect), json!([["3", "abc", "0.5"]]));
    }

    #[test]
    fn submit_does_not_clear_toggle_snapshot() {
        let mut registry = registry_with("k", &matrix(&[&["1", "2"]]));
        dispatch(&mut registry, "k", Command::Toggle).unwrap();
        assert!(registry.snapshot("k").is_some());
        dispatch(&mut registry, "k", Command::Submit).unwrap();
        assert!(registry.snapshot("k").is_some());
    }

    #[test]
    fn repeat_fills_all_cells_with_normalized_first() {
        let mut registry = registry_with("k", &matrix(&[&["3.0", "1", "2"], &["4", "5", "6"]]));
        let effect = dispatch(&mut registry, "k", Command::Repeat).unwrap();
        assert_eq!(
            sent_value(effect),
            json!([["3", "3", "3"], ["3", "3", "3"]])
        );
    }

    #[test]
    fn repeat_rejects_non_numeric_first_cell() {
        let mut registry = registry_with("k", &matrix(&[&["abc", "1"]]));
        let err = dispatch(&mut registry, "k", Command::Repeat).unwrap_err();
        assert!(matches!(err, Error::UnparseableRepeat { .. }));
    }

    #[test]
    fn repeat_rejects_nan_first_cell() {
        let mut registry = registry_with("k", &matrix(&[&["NaN", "1"]]));
        assert!(dispatch(&mut registry, "k", Command::Repeat).is_err());
    }

    #[test]
    fn toggle_is_an_involution() {
        let original = matrix(&[&["1.5", "0"], &["2", "3"]]);
        let mut registry = registry_with("k", &original);

        // Normal -> Toggled: zero fill sent, snapshot stored.
        let effect = dispatch(&mut registry, "k", Command::Toggle).unwrap();
        assert_eq!(sent_value(effect), json!([["0", "0"], ["0", "0"]]));
        assert_eq!(registry.snapshot("k"), Some(&original));

        // Toggled -> Normal: exact pre-toggle value sent back, cell for cell.
        let effect = dispatch(&mut registry, "k", Command::Toggle).unwrap();
        assert_eq!(sent_value(effect), json!([["1.5", "0"], ["2", "3"]]));
        assert!(registry.snapshot("k").is_none());
    }

    #[test]
    fn toggle_scalar_zero_fills_with_one() {
        let mut registry = registry_with("k", &Value::Scalar("0".into()));
        let effect = dispatch(&mut registry, "k", Command::Toggle).unwrap();
        assert_eq!(sent_value(effect), json!("1"));
        // Still a real toggle: the snapshot is held.
        assert_eq!(registry.snapshot("k"), Some(&Value::Scalar("0".into())));
    }

    #[test]
    fn toggle_all_zero_matrix_still_fills_zero() {
        let mut registry = registry_with("k", &matrix(&[&["0", "0"]]));
        let effect = dispatch(&mut registry, "k", Command::Toggle).unwrap();
        assert_eq!(sent_value(effect), json!([["0", "0"]]));
    }

    #[test]
    fn copy_flattens_without_sending() {
        let mut registry = registry_with("k", &matrix(&[&["1", "2"], &["3", "4"]]));
        let effect = dispatch(&mut registry, "k", Command::Copy).unwrap();
        assert_eq!(effect, Some(CommandEffect::CopyText("1 2; 3 4".into())));
    }

    #[test]
    fn unknown_key_is_a_no_op() {
        let mut registry = WidgetRegistry::new();
        for command in [Command::Submit, Command::Repeat, Command::Toggle, Command::Copy] {
            assert_eq!(dispatch(&mut registry, "missing", command).unwrap(), None);
        }
    }
}
