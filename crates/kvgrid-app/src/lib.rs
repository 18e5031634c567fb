//! kvgrid-app - Application state and orchestration for kvgrid
//!
//! This crate implements the TEA (The Elm Architecture) pattern for state
//! management: incoming store batches and key presses become [`Message`]s,
//! the pure [`update`] function folds them into [`AppState`], and side
//! effects come back out as [`UpdateAction`]s for the event loop to run.

pub mod commands;
pub mod config;
pub mod handler;
pub mod input_key;
pub mod message;
pub mod navigation;
pub mod reconcile;
pub mod registry;
pub mod state;

// Re-export primary types
pub use commands::Command;
pub use config::Settings;
pub use handler::{update, UpdateAction, UpdateResult};
pub use input_key::InputKey;
pub use message::Message;
pub use registry::{CellGrid, GridKind, WidgetEntry, WidgetRegistry};
pub use state::{AppState, CardExtent, Focus, NavState, UiMode, ViewportState};

// Re-export store types for the TUI
pub use kvgrid_store::{ConnectionState, StoreEvent};
