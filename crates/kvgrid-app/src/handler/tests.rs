//! End-to-end message flow tests for the update function.

use serde_json::json;

use kvgrid_store::{RawPair, StoreEvent};

use crate::config::Settings;
use crate::handler::{update, UpdateAction};
use crate::input_key::InputKey;
use crate::message::Message;
use crate::state::{AppState, UiMode};

fn push(state: &mut AppState, pairs: &[(&str, serde_json::Value)]) {
    let batch = pairs
        .iter()
        .map(|(key, value)| RawPair {
            key: key.to_string(),
            value: value.clone(),
        })
        .collect();
    update(state, Message::Store(StoreEvent::Batch(batch)));
}

fn press(state: &mut AppState, key: InputKey) -> Option<UpdateAction> {
    let mut result = update(state, Message::Key(key));
    // Follow the message chain the runner would follow.
    while let Some(msg) = result.message.take() {
        let follow = update(state, msg);
        result.message = follow.message;
        result.action = follow.action.or(result.action);
    }
    result.action
}

#[test]
fn push_creates_sorted_cards_and_takes_focus() {
    let mut state = AppState::new(Settings::default());
    push(
        &mut state,
        &[("b", json!([["1"]])), ("a", json!("hello"))],
    );
    assert_eq!(
        state.registry.ordered_keys().collect::<Vec<_>>(),
        vec!["a", "b"]
    );
    assert_eq!(state.focused_key(), Some("a"));
}

#[test]
fn malformed_pair_skipped_rest_of_batch_applies() {
    let mut state = AppState::new(Settings::default());
    push(
        &mut state,
        &[("bad", json!(7)), ("good", json!([["0", "0"]]))],
    );
    assert!(!state.registry.contains("bad"));
    assert!(state.registry.contains("good"));
    assert_eq!(state.last_batch.unwrap().skipped, 1);
}

#[test]
fn edit_then_submit_sends_normalized_value() {
    let mut state = AppState::new(Settings::default());
    push(&mut state, &[("k", json!([["0", "0"]]))]);

    // Clear the focused cell and type "3.0" into it.
    press(&mut state, InputKey::Delete);
    for c in "3.0".chars() {
        press(&mut state, InputKey::Char(c));
    }

    let action = press(&mut state, InputKey::Enter);
    assert_eq!(
        action,
        Some(UpdateAction::SendUpdate {
            key: "k".into(),
            value: json!([["3", "0"]]),
        })
    );
}

#[test]
fn delete_clears_focused_cell() {
    let mut state = AppState::new(Settings::default());
    push(&mut state, &[("k", json!([["abc", "1"]]))]);

    press(&mut state, InputKey::Delete);
    assert_eq!(state.registry.get("k").unwrap().grid.cell(0), Some(""));
    assert_eq!(state.registry.get("k").unwrap().grid.cell(1), Some("1"));
}

#[test]
fn repeat_on_unparseable_first_cell_sends_nothing() {
    let mut state = AppState::new(Settings::default());
    push(&mut state, &[("k", json!([["abc", "1"]]))]);

    let action = press(&mut state, InputKey::CharCtrl('r'));
    assert_eq!(action, None);
    assert!(state.status.as_deref().unwrap().contains("abc"));
}

#[test]
fn repeat_fills_whole_grid_from_first_cell() {
    let mut state = AppState::new(Settings::default());
    push(&mut state, &[("k", json!([["3.0", "1", "2"], ["4", "5", "6"]]))]);

    let action = press(&mut state, InputKey::CharCtrl('r'));
    assert_eq!(
        action,
        Some(UpdateAction::SendUpdate {
            key: "k".into(),
            value: json!([["3", "3", "3"], ["3", "3", "3"]]),
        })
    );
}

#[test]
fn toggle_round_trip_via_keys() {
    let mut state = AppState::new(Settings::default());
    push(&mut state, &[("k", json!([["1.5", "2"]]))]);

    let action = press(&mut state, InputKey::CharCtrl('t'));
    assert_eq!(
        action,
        Some(UpdateAction::SendUpdate {
            key: "k".into(),
            value: json!([["0", "0"]]),
        })
    );
    assert!(state.registry.get("k").unwrap().is_toggled());

    let action = press(&mut state, InputKey::CharCtrl('t'));
    assert_eq!(
        action,
        Some(UpdateAction::SendUpdate {
            key: "k".into(),
            value: json!([["1.5", "2"]]),
        })
    );
    assert!(!state.registry.get("k").unwrap().is_toggled());
}

#[test]
fn copy_produces_clipboard_action_only() {
    let mut state = AppState::new(Settings::default());
    push(&mut state, &[("k", json!([["1", "2"], ["3", "4"]]))]);

    let action = press(&mut state, InputKey::CharCtrl('y'));
    assert_eq!(action, Some(UpdateAction::CopyToClipboard("1 2; 3 4".into())));
}

#[test]
fn nav_index_selection_returns_to_detail_mode() {
    let mut state = AppState::new(Settings::default());
    push(&mut state, &[("a", json!("1")), ("b", json!("2"))]);

    press(&mut state, InputKey::CharCtrl('n'));
    assert_eq!(state.ui_mode, UiMode::NavIndex);
    press(&mut state, InputKey::Down);
    press(&mut state, InputKey::Enter);
    assert_eq!(state.ui_mode, UiMode::Detail);
    assert_eq!(state.focused_key(), Some("b"));
}

#[test]
fn home_end_and_page_keys_navigate() {
    let mut state = AppState::new(Settings::default());
    push(
        &mut state,
        &[("a", json!([["1", "2", "3"]])), ("b", json!("4"))],
    );

    press(&mut state, InputKey::End);
    assert_eq!(state.focus.as_ref().map(|f| f.cell), Some(2));
    press(&mut state, InputKey::Home);
    assert_eq!(state.focus.as_ref().map(|f| f.cell), Some(0));

    press(&mut state, InputKey::PageDown);
    assert_eq!(state.focused_key(), Some("b"));
    press(&mut state, InputKey::PageUp);
    assert_eq!(state.focused_key(), Some("a"));

    // In the navigation index the same keys move the highlight.
    press(&mut state, InputKey::CharCtrl('n'));
    press(&mut state, InputKey::End);
    assert_eq!(state.nav_selected, 1);
    press(&mut state, InputKey::Home);
    assert_eq!(state.nav_selected, 0);
    press(&mut state, InputKey::PageDown);
    assert_eq!(state.nav_selected, 1);
    press(&mut state, InputKey::PageUp);
    assert_eq!(state.nav_selected, 0);
}

#[test]
fn quit_keys_set_the_flag() {
    let mut state = AppState::new(Settings::default());
    press(&mut state, InputKey::CharCtrl('c'));
    assert!(state.should_quit);
}

#[test]
fn echo_push_converges_widget_to_server_value() {
    let mut state = AppState::new(Settings::default());
    push(&mut state, &[("k", json!([["1", "2"]]))]);

    // Local edit diverges from the store...
    press(&mut state, InputKey::Char('9'));
    assert_eq!(state.registry.get("k").unwrap().grid.cell(0), Some("19"));

    // ...until the next push wins.
    push(&mut state, &[("k", json!([["7", "2"]]))]);
    assert_eq!(state.registry.get("k").unwrap().grid.cell(0), Some("7"));
}
