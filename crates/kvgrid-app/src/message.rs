//! Message types for the application (TEA pattern)

use crate::commands::Command;
use crate::input_key::InputKey;
use kvgrid_store::StoreEvent;

/// All possible messages/actions in the application
#[derive(Debug, Clone)]
pub enum Message {
    /// Keyboard event from terminal
    Key(InputKey),

    /// Event from the store bridge connection
    Store(StoreEvent),

    /// Tick event for periodic updates (drives the scroll animation)
    Tick,

    /// Quit the application
    Quit,

    /// Run an edit command against the card for `key`
    Command { key: String, command: Command },
}
