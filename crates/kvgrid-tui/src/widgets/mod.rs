//! Custom widget components

mod header;
mod key_card;
mod nav_index;
mod status_bar;

pub use header::Header;
pub use key_card::KeyCard;
pub use nav_index::NavIndex;
pub use status_bar::StatusBar;

use ratatui::layout::Rect;

/// Center a fixed-size rect within an area, clamped to the area dimensions.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}
