//! Application state (Model in TEA pattern)

use kvgrid_store::ConnectionState;

use crate::config::Settings;
use crate::reconcile::BatchStats;
use crate::registry::WidgetRegistry;

/// Current UI mode/screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiMode {
    /// Editing cells in the detail pane
    #[default]
    Detail,

    /// Navigating the key index popup
    NavIndex,
}

/// Card-level focus: which key's card holds the cursor, and which cell by
/// row-major index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Focus {
    pub key: String,
    pub cell: usize,
}

/// Vertical extent of one rendered card within the detail pane's content,
/// reported back by the renderer each frame so the navigation helper can do
/// viewport math without knowing how cards are drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardExtent {
    pub key: String,
    /// Top row of the card in content coordinates (0 = first content row).
    pub top: usize,
    pub height: usize,
}

/// Detail-pane geometry from the last render.
#[derive(Debug, Clone, Default)]
pub struct ViewportState {
    /// Visible height of the detail pane in rows.
    pub height: usize,
    /// Total content height in rows.
    pub content_height: usize,
    /// Card extents in detail order.
    pub extents: Vec<CardExtent>,
}

impl ViewportState {
    pub fn extent_of(&self, key: &str) -> Option<&CardExtent> {
        self.extents.iter().find(|e| e.key == key)
    }

    /// Largest useful scroll offset.
    pub fn max_scroll(&self) -> usize {
        self.content_height.saturating_sub(self.height)
    }
}

/// Scroll-then-focus state machine for cross-card navigation.
///
/// While a scroll animation is in flight, further tab-navigation input is
/// ignored; the pending focus is applied when the animation reaches its
/// target and the state returns to `Idle` unconditionally.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NavState {
    #[default]
    Idle,
    ScrollPending {
        /// Scroll offset the animation is converging to.
        target: usize,
        /// Focus applied once the target is reached.
        focus: Focus,
    },
}

impl NavState {
    /// The in-flight guard: `true` while a scroll animation is running.
    pub fn in_flight(&self) -> bool {
        matches!(self, NavState::ScrollPending { .. })
    }
}

/// The complete application state, exclusively owned by the event loop.
#[derive(Debug)]
pub struct AppState {
    pub settings: Settings,
    pub registry: WidgetRegistry,
    pub focus: Option<Focus>,
    pub ui_mode: UiMode,
    /// Highlighted row in the navigation index.
    pub nav_selected: usize,
    /// Detail pane scroll offset in content rows.
    pub scroll_offset: usize,
    pub nav_state: NavState,
    pub viewport: ViewportState,
    pub connection: ConnectionState,
    /// Tallies from the most recent push batch, for the status line.
    pub last_batch: Option<BatchStats>,
    /// One-line diagnostic shown in the status bar.
    pub status: Option<String>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            registry: WidgetRegistry::new(),
            focus: None,
            ui_mode: UiMode::default(),
            nav_selected: 0,
            scroll_offset: 0,
            nav_state: NavState::default(),
            viewport: ViewportState::default(),
            connection: ConnectionState::Connecting,
            last_batch: None,
            status: None,
            should_quit: false,
        }
    }

    /// Key of the currently focused card, if any.
    pub fn focused_key(&self) -> Option<&str> {
        self.focus.as_ref().map(|f| f.key.as_str())
    }

    /// Put focus on the first cell of the first card if nothing holds focus
    /// yet. Called after pushes so the dashboard is immediately editable.
    pub fn ensure_focus(&mut self) {
        if self.focus.is_none() {
            if let Some(key) = self.registry.key_at(0) {
                self.focus = Some(Focus {
                    key: key.to_string(),
                    cell: 0,
                });
            }
        }
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }
}
