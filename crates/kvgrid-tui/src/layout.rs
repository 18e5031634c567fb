//! Screen layout and card geometry
//!
//! Splits the screen into header, card column, and status bar, and computes
//! the row extent of every card in the column. Extents are written back into
//! the app state's viewport so navigation can do its scroll math against the
//! same geometry the renderer used.

use kvgrid_app::state::CardExtent;
use kvgrid_app::WidgetRegistry;
use ratatui::layout::{Constraint, Layout, Rect};

/// Rows a card occupies beyond its grid rows: title line plus one blank
/// separator line.
pub const CARD_CHROME_ROWS: usize = 2;

/// Screen areas for the main layout
#[derive(Debug, Clone, Copy)]
pub struct ScreenAreas {
    /// Header area (title + connection state)
    pub header: Rect,

    /// Scrollable card column
    pub content: Rect,

    /// Single-row status bar
    pub status: Rect,
}

/// Create the main screen layout
pub fn create(area: Rect) -> ScreenAreas {
    let constraints = vec![
        Constraint::Length(3), // Header (bordered)
        Constraint::Min(1),    // Card column
        Constraint::Length(1), // Status bar
    ];

    let chunks = Layout::vertical(constraints).split(area);

    ScreenAreas {
        header: chunks[0],
        content: chunks[1],
        status: chunks[2],
    }
}

/// Compute the extent of every card in detail order, plus the total content
/// height in rows.
pub fn measure_cards(registry: &WidgetRegistry) -> (Vec<CardExtent>, usize) {
    let mut extents = Vec::with_capacity(registry.len());
    let mut top = 0;
    for entry in registry.iter() {
        let height = entry.grid.rows().len() + CARD_CHROME_ROWS;
        extents.push(CardExtent {
            key: entry.key.clone(),
            top,
            height,
        });
        top += height;
    }
    (extents, top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvgrid_app::WidgetEntry;
    use kvgrid_core::Value;

    fn registry_with(pairs: &[(&str, Value)]) -> WidgetRegistry {
        let mut registry = WidgetRegistry::default();
        for (key, value) in pairs {
            registry.insert_sorted(WidgetEntry::new(*key, value));
        }
        registry
    }

    #[test]
    fn test_create_layout() {
        let area = Rect::new(0, 0, 80, 24);
        let areas = create(area);

        assert_eq!(areas.header.height, 3);
        assert_eq!(areas.content.height, 20);
        assert_eq!(areas.content.y, 3);
        assert_eq!(areas.status.height, 1);
        assert_eq!(areas.status.y, 23);
    }

    #[test]
    fn test_measure_scalar_card() {
        let registry = registry_with(&[("a", Value::Scalar("1".into()))]);
        let (extents, total) = measure_cards(&registry);

        // One grid row plus title and separator.
        assert_eq!(extents.len(), 1);
        assert_eq!(extents[0].top, 0);
        assert_eq!(extents[0].height, 3);
        assert_eq!(total, 3);
    }

    #[test]
    fn test_measure_stacked_cards_in_detail_order() {
        let matrix = Value::Matrix(vec![
            vec!["1".into(), "2".into()],
            vec!["3".into(), "4".into()],
        ]);
        let registry = registry_with(&[("b", Value::Scalar("x".into())), ("a", matrix)]);
        let (extents, total) = measure_cards(&registry);

        assert_eq!(extents[0].key, "a");
        assert_eq!(extents[0].top, 0);
        assert_eq!(extents[0].height, 4);
        assert_eq!(extents[1].key, "b");
        assert_eq!(extents[1].top, 4);
        assert_eq!(extents[1].height, 3);
        assert_eq!(total, 7);
    }
}
