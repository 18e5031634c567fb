//! Header bar: app title, store URL, and keybinding hints

use kvgrid_store::ConnectionState;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme;

pub struct Header<'a> {
    store_url: &'a str,
    connection: &'a ConnectionState,
}

impl<'a> Header<'a> {
    pub fn new(store_url: &'a str, connection: &'a ConnectionState) -> Self {
        Self {
            store_url,
            connection,
        }
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let connected = matches!(self.connection, ConnectionState::Connected);
        let block = theme::bordered_block(connected);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let line = Line::from(vec![
            Span::styled("kvgrid", theme::accent_bold()),
            Span::raw("  "),
            Span::styled(self.store_url, theme::text_secondary()),
            Span::raw("  "),
            Span::styled(
                "enter:submit  ^r:repeat  ^t:toggle  ^y:copy  ^n:keys  tab:next  ^q:quit",
                theme::text_muted(),
            ),
        ]);
        Paragraph::new(line).render(inner, buf);
    }
}
