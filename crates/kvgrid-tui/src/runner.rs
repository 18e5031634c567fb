//! Main TUI runner - entry point and event loop
//!
//! Connects to the store bridge, then drives the TEA loop: drain store
//! events, poll the terminal, fold everything through the update function,
//! execute the resulting actions, render.

use kvgrid_app::config::Settings;
use kvgrid_app::handler::{update, UpdateAction};
use kvgrid_app::message::Message;
use kvgrid_app::state::AppState;
use kvgrid_core::prelude::*;
use kvgrid_store::{StoreClient, UpdateHandle};
use std::time::Duration;

use crate::clipboard::Clipboard;
use crate::{event, render};

/// Run the TUI application against the store bridge in `settings`.
pub async fn run(settings: Settings) -> Result<()> {
    install_panic_hook();

    // Connect before touching the terminal so a bad URL fails with a plain
    // error message instead of a corrupted screen.
    let mut client = StoreClient::connect(&settings.store_url).await?;
    let handle = client.update_handle();

    let mut term = ratatui::try_init().map_err(|e| Error::TerminalInit(e.to_string()))?;
    let mut state = AppState::new(settings);
    let result = run_loop(&mut term, &mut state, &mut client, handle);

    client.disconnect().await;
    ratatui::restore();

    result
}

/// Put the terminal back into cooked mode before the default panic
/// output runs, so the message is readable instead of smeared across the
/// alternate screen.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        default_hook(info);
    }));
}

/// Main event loop
fn run_loop(
    terminal: &mut ratatui::DefaultTerminal,
    state: &mut AppState,
    client: &mut StoreClient,
    handle: UpdateHandle,
) -> Result<()> {
    let tick_rate = Duration::from_millis(state.settings.tick_rate_ms);
    let mut clipboard = Clipboard::new();

    while !state.should_quit {
        // Drain store events (non-blocking).
        while let Ok(store_event) = client.event_receiver().try_recv() {
            process_message(state, Message::Store(store_event), &handle, &mut clipboard);
        }

        // Render.
        terminal
            .draw(|frame| render::view(frame, state))
            .context("terminal draw failed")?;

        // Handle terminal events; a poll timeout becomes a tick.
        if let Some(message) = event::poll(tick_rate)? {
            process_message(state, message, &handle, &mut clipboard);
        }
    }

    Ok(())
}

/// Run one message through update, following the follow-up chain and
/// executing any actions.
fn process_message(
    state: &mut AppState,
    message: Message,
    handle: &UpdateHandle,
    clipboard: &mut Clipboard,
) {
    let mut next = Some(message);
    while let Some(message) = next.take() {
        let result = update(state, message);
        next = result.message;
        if let Some(action) = result.action {
            execute_action(state, action, handle, clipboard);
        }
    }
}

fn execute_action(
    state: &mut AppState,
    action: UpdateAction,
    handle: &UpdateHandle,
    clipboard: &mut Clipboard,
) {
    match action {
        UpdateAction::SendUpdate { key, value } => {
            debug!("sending update for {:?}", key);
            let handle = handle.clone();
            tokio::spawn(async move {
                if let Err(e) = handle.send_update(key, value).await {
                    warn!("failed to send update: {}", e);
                }
            });
        }
        UpdateAction::CopyToClipboard(text) => {
            if let Err(e) = clipboard.copy(&text) {
                warn!("clipboard copy failed: {}", e);
                state.set_status(e.to_string());
            }
        }
    }
}
