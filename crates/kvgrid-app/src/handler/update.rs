//! Main update function - handles state transitions (TEA pattern)

use kvgrid_core::prelude::*;

use crate::commands::{dispatch, CommandEffect};
use crate::message::Message;
use crate::navigation;
use crate::state::AppState;

use super::{keys::handle_key, store::handle_store_event, UpdateAction, UpdateResult};

/// Process a message and update state.
/// Returns optional follow-up message and/or action.
pub fn update(state: &mut AppState, message: Message) -> UpdateResult {
    match message {
        Message::Quit => {
            state.should_quit = true;
            UpdateResult::none()
        }

        Message::Key(key) => {
            if let Some(msg) = handle_key(state, key) {
                UpdateResult::message(msg)
            } else {
                UpdateResult::none()
            }
        }

        Message::Store(event) => handle_store_event(state, event),

        Message::Tick => {
            navigation::tick(state);
            UpdateResult::none()
        }

        Message::Command { key, command } => match dispatch(&mut state.registry, &key, command) {
            Ok(Some(CommandEffect::Send { key, value })) => {
                UpdateResult::action(UpdateAction::SendUpdate { key, value })
            }
            Ok(Some(CommandEffect::CopyText(text))) => {
                state.set_status(format!("copied {key}"));
                UpdateResult::action(UpdateAction::CopyToClipboard(text))
            }
            Ok(None) => UpdateResult::none(),
            Err(err) => {
                // UnparseableRepeat lands here: no send, no state change,
                // diagnostic only.
                warn!("command {:?} on {:?} failed: {}", command, key, err);
                state.set_status(err.to_string());
                UpdateResult::none()
            }
        },
    }
}
