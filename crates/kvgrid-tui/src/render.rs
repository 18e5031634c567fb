//! Main render/view function (View in TEA pattern)

use kvgrid_app::state::{AppState, UiMode, ViewportState};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

use crate::layout;
use crate::theme;
use crate::widgets;

/// Render the complete UI.
///
/// Mutates state only to record rendering geometry: the card extents and
/// viewport height the navigation math runs against, and the scroll offset
/// clamped to the freshly measured content.
pub fn view(frame: &mut Frame, state: &mut AppState) {
    let area = frame.area();

    let bg = Block::default().style(Style::default().bg(theme::DEEPEST_BG));
    frame.render_widget(bg, area);

    let areas = layout::create(area);

    // Measure cards and publish the geometry before anything scroll-aware
    // renders.
    let (extents, content_height) = layout::measure_cards(&state.registry);
    state.viewport = ViewportState {
        height: areas.content.height as usize,
        content_height,
        extents,
    };
    state.scroll_offset = state.scroll_offset.min(state.viewport.max_scroll());

    frame.render_widget(
        widgets::Header::new(&state.settings.store_url, &state.connection),
        areas.header,
    );

    // The card column as one paragraph, scrolled by row offset. Cards half
    // off the top clip cleanly because the scroll is in whole lines.
    let mut lines: Vec<Line> = Vec::with_capacity(content_height);
    for entry in state.registry.iter() {
        let focused_cell = state
            .focus
            .as_ref()
            .filter(|f| f.key == entry.key)
            .map(|f| f.cell);
        lines.extend(widgets::KeyCard::new(entry).focused_cell(focused_cell).lines());
    }
    if lines.is_empty() {
        lines.push(Line::styled(
            "  waiting for keys...",
            theme::text_muted(),
        ));
    }
    let column = Paragraph::new(lines).scroll((state.scroll_offset as u16, 0));
    frame.render_widget(column, areas.content);

    frame.render_widget(
        widgets::StatusBar::new(&state.connection)
            .last_batch(state.last_batch)
            .message(state.status.as_deref()),
        areas.status,
    );

    if state.ui_mode == UiMode::NavIndex {
        frame.render_widget(
            widgets::NavIndex::new(state.registry.nav_keys(), state.nav_selected),
            area,
        );
    }
}
