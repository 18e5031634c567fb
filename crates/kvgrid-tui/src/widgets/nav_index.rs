//! Key index popup: jump-to-key navigation over the sorted key list

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph, Widget},
};

use crate::theme;

use super::centered_rect;

/// Centered popup listing every key in sorted order, one highlighted.
pub struct NavIndex<'a> {
    keys: &'a [String],
    selected: usize,
}

impl<'a> NavIndex<'a> {
    pub fn new(keys: &'a [String], selected: usize) -> Self {
        Self { keys, selected }
    }

    /// Popup size for `area`: wide enough for the longest key, tall enough
    /// for every key, clamped to the screen.
    fn popup_rect(&self, area: Rect) -> Rect {
        let widest = self.keys.iter().map(String::len).max().unwrap_or(0);
        let width = (widest as u16 + 6).max(20);
        let height = self.keys.len() as u16 + 2;
        centered_rect(width, height, area)
    }
}

impl Widget for NavIndex<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = self.popup_rect(area);
        Clear.render(popup, buf);

        let block = theme::bordered_block(true)
            .title(" keys ")
            .style(Style::default().bg(theme::POPUP_BG));
        let inner = block.inner(popup);
        block.render(popup, buf);

        // Keep the highlighted row visible when the list overflows.
        let visible = inner.height as usize;
        let skip = if visible == 0 {
            0
        } else {
            self.selected.saturating_sub(visible - 1)
        };

        let lines: Vec<Line> = self
            .keys
            .iter()
            .enumerate()
            .skip(skip)
            .take(visible)
            .map(|(i, key)| {
                if i == self.selected {
                    Line::from(Span::styled(format!("▸ {key}"), theme::accent_bold()))
                } else {
                    Line::from(Span::styled(format!("  {key}"), theme::text_primary()))
                }
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_is_centered_and_sized_to_keys() {
        let keys = vec!["alpha".to_string(), "beta".to_string()];
        let nav = NavIndex::new(&keys, 0);
        let popup = nav.popup_rect(Rect::new(0, 0, 80, 24));

        assert_eq!(popup.width, 20); // minimum width
        assert_eq!(popup.height, 4); // two keys plus borders
        assert_eq!(popup.x, 30);
        assert_eq!(popup.y, 10);
    }

    #[test]
    fn highlighted_key_is_marked() {
        let keys = vec!["alpha".to_string(), "beta".to_string()];
        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);
        NavIndex::new(&keys, 1).render(area, &mut buf);

        let rows: Vec<String> = (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect()
            })
            .collect();
        let all = rows.join("\n");
        assert!(all.contains("▸ beta"));
        assert!(all.contains("  alpha"));
    }
}
