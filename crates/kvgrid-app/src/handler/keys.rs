//! Key event handlers for UI modes

use crate::commands::Command;
use crate::input_key::InputKey;
use crate::message::Message;
use crate::navigation::{self, Direction};
use crate::state::{AppState, UiMode};

/// Keys skipped per PageUp/PageDown press in the navigation index.
const NAV_PAGE: usize = 10;

/// Translate a key press into state mutations and an optional follow-up
/// message, depending on the current UI mode.
pub fn handle_key(state: &mut AppState, key: InputKey) -> Option<Message> {
    // Global bindings first.
    match key {
        InputKey::CharCtrl('c') | InputKey::CharCtrl('q') => return Some(Message::Quit),
        InputKey::CharCtrl('n') => {
            state.ui_mode = match state.ui_mode {
                UiMode::Detail => {
                    // Start the index on the focused card.
                    if let Some(key) = state.focused_key() {
                        if let Some(pos) = state.registry.position(key) {
                            state.nav_selected = pos;
                        }
                    }
                    UiMode::NavIndex
                }
                UiMode::NavIndex => UiMode::Detail,
            };
            return None;
        }
        _ => {}
    }

    match state.ui_mode {
        UiMode::NavIndex => handle_nav_index_key(state, key),
        UiMode::Detail => handle_detail_key(state, key),
    }
}

fn handle_nav_index_key(state: &mut AppState, key: InputKey) -> Option<Message> {
    match key {
        InputKey::Up => {
            state.nav_selected = state.nav_selected.saturating_sub(1);
        }
        InputKey::Down => {
            let last = state.registry.len().saturating_sub(1);
            state.nav_selected = (state.nav_selected + 1).min(last);
        }
        InputKey::PageUp => {
            state.nav_selected = state.nav_selected.saturating_sub(NAV_PAGE);
        }
        InputKey::PageDown => {
            let last = state.registry.len().saturating_sub(1);
            state.nav_selected = (state.nav_selected + NAV_PAGE).min(last);
        }
        InputKey::Home => {
            state.nav_selected = 0;
        }
        InputKey::End => {
            state.nav_selected = state.registry.len().saturating_sub(1);
        }
        InputKey::Enter => {
            navigation::select_from_nav(state);
        }
        InputKey::Esc => {
            state.ui_mode = UiMode::Detail;
        }
        _ => {}
    }
    None
}

fn handle_detail_key(state: &mut AppState, key: InputKey) -> Option<Message> {
    match key {
        // ── Commands on the focused card ─────────────────────────────
        InputKey::Enter => {
            return state.focused_key().map(|key| Message::Command {
                key: key.to_string(),
                command: Command::Submit,
            });
        }
        InputKey::CharCtrl('r') => {
            return state.focused_key().map(|key| Message::Command {
                key: key.to_string(),
                command: Command::Repeat,
            });
        }
        InputKey::CharCtrl('t') => {
            return state.focused_key().map(|key| Message::Command {
                key: key.to_string(),
                command: Command::Toggle,
            });
        }
        InputKey::CharCtrl('y') => {
            return state.focused_key().map(|key| Message::Command {
                key: key.to_string(),
                command: Command::Copy,
            });
        }

        // ── Focus movement ───────────────────────────────────────────
        InputKey::Tab => navigation::advance_cell(state, Direction::Forward),
        InputKey::BackTab => navigation::advance_cell(state, Direction::Backward),
        InputKey::Home => navigation::focus_card_edge(state, Direction::Backward),
        InputKey::End => navigation::focus_card_edge(state, Direction::Forward),
        InputKey::PageUp => navigation::advance_card(state, Direction::Backward),
        InputKey::PageDown => navigation::advance_card(state, Direction::Forward),
        InputKey::Left => navigation::move_within_card(state, -1, 0),
        InputKey::Right => navigation::move_within_card(state, 1, 0),
        InputKey::Up => navigation::move_within_card(state, 0, -1),
        InputKey::Down => navigation::move_within_card(state, 0, 1),

        // ── Cell editing ─────────────────────────────────────────────
        InputKey::Char(c) => edit_focused_cell(state, |text| text.push(c)),
        InputKey::Backspace => edit_focused_cell(state, |text| {
            text.pop();
        }),
        InputKey::Delete => edit_focused_cell(state, String::clear),

        _ => {}
    }
    None
}

/// Apply `edit` to the focused cell's text, if a cell holds focus.
fn edit_focused_cell(state: &mut AppState, edit: impl FnOnce(&mut String)) {
    let Some(focus) = state.focus.clone() else {
        return;
    };
    if let Some(entry) = state.registry.get_mut(&focus.key) {
        if let Some(text) = entry.grid.cell_mut(focus.cell) {
            edit(text);
        }
    }
}
