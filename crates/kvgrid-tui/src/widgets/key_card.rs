//! Key card: one store key rendered as a title line plus a grid of cells
//!
//! Cards are produced as plain [`Line`]s rather than a boxed widget so the
//! whole column can be concatenated into a single paragraph and scrolled by
//! row offset. The line count must stay in step with
//! [`crate::layout::measure_cards`]: one title line, one line per grid row,
//! one blank separator.

use kvgrid_app::WidgetEntry;
use ratatui::text::{Line, Span};

use crate::theme;

/// Renders one widget entry as a card of text lines.
pub struct KeyCard<'a> {
    entry: &'a WidgetEntry,
    /// Row-major index of the focused cell, when this card holds focus.
    focused_cell: Option<usize>,
}

impl<'a> KeyCard<'a> {
    pub fn new(entry: &'a WidgetEntry) -> Self {
        Self {
            entry,
            focused_cell: None,
        }
    }

    pub fn focused_cell(mut self, cell: Option<usize>) -> Self {
        self.focused_cell = cell;
        self
    }

    /// Build the card's lines: title, grid rows, separator.
    pub fn lines(&self) -> Vec<Line<'a>> {
        let mut lines = Vec::with_capacity(self.entry.grid.rows().len() + 2);
        lines.push(self.title_line());

        let mut cell_index = 0;
        for row in self.entry.grid.rows() {
            let mut spans = vec![Span::raw("  ")];
            for text in row {
                let style = if self.focused_cell == Some(cell_index) {
                    theme::cell_focused()
                } else {
                    theme::text_primary()
                };
                // Empty cells still need a visible hit target.
                let shown: &str = if text.is_empty() { " " } else { text };
                spans.push(Span::styled(format!("[{shown}]"), style));
                spans.push(Span::raw(" "));
                cell_index += 1;
            }
            lines.push(Line::from(spans));
        }

        lines.push(Line::raw(""));
        lines
    }

    fn title_line(&self) -> Line<'a> {
        let mut spans = vec![
            Span::styled("▪ ", theme::accent_bold()),
            Span::styled(self.entry.key.as_str(), theme::accent_bold()),
        ];
        if self.entry.is_toggled() {
            spans.push(Span::styled("  toggled", theme::text_muted()));
        }
        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvgrid_core::Value;

    fn matrix_entry() -> WidgetEntry {
        WidgetEntry::new(
            "robot_q",
            &Value::Matrix(vec![
                vec!["1.5".into(), "2".into()],
                vec!["3".into(), "".into()],
            ]),
        )
    }

    #[test]
    fn line_count_matches_measured_height() {
        let entry = matrix_entry();
        let lines = KeyCard::new(&entry).lines();
        assert_eq!(
            lines.len(),
            entry.grid.rows().len() + crate::layout::CARD_CHROME_ROWS
        );
    }

    #[test]
    fn title_carries_the_key() {
        let entry = matrix_entry();
        let lines = KeyCard::new(&entry).lines();
        let title: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(title.contains("robot_q"));
    }

    #[test]
    fn focused_cell_gets_the_focus_style() {
        let entry = matrix_entry();
        let lines = KeyCard::new(&entry).focused_cell(Some(1)).lines();
        // Second cell of the first grid row (spans: indent, [1.5], gap, [2], gap).
        assert_eq!(lines[1].spans[3].style, theme::cell_focused());
        assert_eq!(lines[1].spans[1].style, theme::text_primary());
    }

    #[test]
    fn empty_cell_renders_a_placeholder() {
        let entry = matrix_entry();
        let lines = KeyCard::new(&entry).lines();
        let row: String = lines[2].spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(row.contains("[ ]"));
    }

    #[test]
    fn toggled_entry_is_marked() {
        let mut entry = matrix_entry();
        entry.snapshot = Some(Value::Scalar("1".into()));
        let lines = KeyCard::new(&entry).lines();
        let title: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(title.contains("toggled"));
    }
}
