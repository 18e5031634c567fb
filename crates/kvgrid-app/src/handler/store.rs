//! Store connection event handling

use kvgrid_core::prelude::*;
use kvgrid_store::{ConnectionState, StoreEvent};

use crate::reconcile::apply_batch;
use crate::state::AppState;

use super::UpdateResult;

/// Fold a store event into the application state.
pub fn handle_store_event(state: &mut AppState, event: StoreEvent) -> UpdateResult {
    match event {
        StoreEvent::Connected => {
            state.connection = ConnectionState::Connected;
            state.set_status("connected");
        }
        StoreEvent::Reconnecting { attempt } => {
            state.connection = ConnectionState::Reconnecting { attempt };
            state.set_status(format!("reconnecting (attempt {attempt})"));
        }
        StoreEvent::Disconnected => {
            state.connection = ConnectionState::Disconnected;
            state.set_status("disconnected");
        }
        StoreEvent::Batch(batch) => {
            let stats = apply_batch(&mut state.registry, &mut state.focus, &batch);
            if stats.skipped > 0 {
                warn!("batch applied with {} malformed pair(s) skipped", stats.skipped);
            }
            state.last_batch = Some(stats);
            state.ensure_focus();
        }
    }
    UpdateResult::none()
}
