//! Status bar: connection state, last batch tallies, and diagnostics

use kvgrid_app::reconcile::BatchStats;
use kvgrid_store::ConnectionState;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme;

pub struct StatusBar<'a> {
    connection: &'a ConnectionState,
    last_batch: Option<BatchStats>,
    message: Option<&'a str>,
}

impl<'a> StatusBar<'a> {
    pub fn new(connection: &'a ConnectionState) -> Self {
        Self {
            connection,
            last_batch: None,
            message: None,
        }
    }

    pub fn last_batch(mut self, stats: Option<BatchStats>) -> Self {
        self.last_batch = stats;
        self
    }

    pub fn message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }

    fn connection_span(&self) -> Span<'static> {
        let (text, color) = match self.connection {
            ConnectionState::Connected => ("● connected".to_string(), theme::STATUS_GREEN),
            ConnectionState::Connecting => ("◌ connecting".to_string(), theme::STATUS_YELLOW),
            ConnectionState::Reconnecting { attempt } => {
                (format!("◌ reconnecting #{attempt}"), theme::STATUS_YELLOW)
            }
            ConnectionState::Disconnected => ("○ disconnected".to_string(), theme::STATUS_RED),
        };
        Span::styled(text, Style::default().fg(color))
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![self.connection_span(), Span::raw("  ")];

        if let Some(stats) = self.last_batch {
            spans.push(Span::styled(
                format!(
                    "batch: {} created {} patched {} rebuilt {} skipped",
                    stats.created, stats.patched, stats.rebuilt, stats.skipped
                ),
                theme::text_muted(),
            ));
            spans.push(Span::raw("  "));
        }

        if let Some(message) = self.message {
            spans.push(Span::styled(message.to_string(), theme::text_secondary()));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(bar: StatusBar) -> String {
        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        bar.render(area, &mut buf);
        (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect()
    }

    #[test]
    fn shows_connection_and_message() {
        let text = rendered(
            StatusBar::new(&ConnectionState::Connected).message(Some("copied robot_q")),
        );
        assert!(text.contains("connected"));
        assert!(text.contains("copied robot_q"));
    }

    #[test]
    fn shows_reconnect_attempt() {
        let text = rendered(StatusBar::new(&ConnectionState::Reconnecting { attempt: 3 }));
        assert!(text.contains("reconnecting #3"));
    }

    #[test]
    fn shows_batch_tallies() {
        let stats = BatchStats {
            created: 2,
            patched: 1,
            rebuilt: 0,
            skipped: 1,
        };
        let text = rendered(StatusBar::new(&ConnectionState::Connected).last_batch(Some(stats)));
        assert!(text.contains("2 created"));
        assert!(text.contains("1 skipped"));
    }
}
