//! kvgrid-tui - Terminal UI for kvgrid
//!
//! This crate provides the ratatui-based terminal interface. It drives the
//! update function from kvgrid-app with terminal events, store events, and
//! ticks, and renders the widget registry as a scrollable column of cards.

pub mod clipboard;
pub mod event;
pub mod layout;
pub mod render;
pub mod runner;
pub mod theme;
pub mod widgets;

// Re-export main entry point
pub use runner::run;
