//! Navigation helper: cross-card focus movement and scroll-into-view.
//!
//! Layered on top of the registry's ordering. Cross-card jumps that land
//! outside the viewport run a bounded scroll animation first; the focus
//! change is applied when the animation completes. The
//! [`NavState`] in-flight guard suppresses further tab-navigation input for
//! the duration so the pending focus cannot race with a second jump.

use kvgrid_core::prelude::*;

use crate::state::{AppState, CardExtent, Focus, NavState, UiMode, ViewportState};

/// Tab navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Fraction of the viewport height used as the comfortable-band margin.
const BAND_DIVISOR: usize = 6;

/// Divisor for the per-tick animation step (quarter of the remaining
/// distance, minimum one row, so the animation is strictly bounded).
const SCROLL_STEP_DIVISOR: usize = 4;

/// Move focus one cell forward or backward, crossing card boundaries.
///
/// At the last cell of a card, forward moves to the first cell of the next
/// card in lexicographic order (backward symmetric from the first cell).
/// There is no wrap-around at either end. Ignored while a scroll animation
/// is in flight.
pub fn advance_cell(state: &mut AppState, direction: Direction) {
    if state.nav_state.in_flight() {
        debug!("tab navigation suppressed: scroll animation in flight");
        return;
    }
    let Some(focus) = state.focus.clone() else {
        state.ensure_focus();
        return;
    };
    let Some(entry) = state.registry.get(&focus.key) else {
        return;
    };
    let cell_count = entry.grid.cell_count();

    match direction {
        Direction::Forward => {
            if focus.cell + 1 < cell_count {
                state.focus = Some(Focus {
                    cell: focus.cell + 1,
                    ..focus
                });
                return;
            }
            // Boundary: first cell of the next card, if there is one.
            let Some(pos) = state.registry.position(&focus.key) else {
                return;
            };
            let Some(next_key) = state.registry.key_at(pos + 1).map(str::to_string) else {
                return;
            };
            jump_to_card(state, Focus { key: next_key, cell: 0 });
        }
        Direction::Backward => {
            if focus.cell > 0 {
                state.focus = Some(Focus {
                    cell: focus.cell - 1,
                    ..focus
                });
                return;
            }
            let Some(pos) = state.registry.position(&focus.key) else {
                return;
            };
            let Some(prev_key) = pos
                .checked_sub(1)
                .and_then(|p| state.registry.key_at(p))
                .map(str::to_string)
            else {
                return;
            };
            let last_cell = state
                .registry
                .get(&prev_key)
                .map_or(0, |e| e.grid.cell_count().saturating_sub(1));
            jump_to_card(
                state,
                Focus {
                    key: prev_key,
                    cell: last_cell,
                },
            );
        }
    }
}

/// Move focus within the focused card: `dx` cells horizontally or `dy` rows
/// vertically (column clamped to the destination row's width).
pub fn move_within_card(state: &mut AppState, dx: isize, dy: isize) {
    let Some(focus) = state.focus.clone() else {
        return;
    };
    let Some(entry) = state.registry.get(&focus.key) else {
        return;
    };
    let grid = &entry.grid;

    let new_cell = if dy != 0 {
        let Some((row, col)) = grid.locate(focus.cell) else {
            return;
        };
        let rows = grid.rows();
        let new_row = row.saturating_add_signed(dy).min(rows.len().saturating_sub(1));
        let new_col = col.min(rows[new_row].len().saturating_sub(1));
        rows[..new_row].iter().map(Vec::len).sum::<usize>() + new_col
    } else {
        focus
            .cell
            .saturating_add_signed(dx)
            .min(grid.cell_count().saturating_sub(1))
    };

    state.focus = Some(Focus {
        cell: new_cell,
        ..focus
    });
}

/// Move focus to the first or last cell of the focused card.
pub fn focus_card_edge(state: &mut AppState, direction: Direction) {
    let Some(focus) = state.focus.clone() else {
        return;
    };
    let Some(entry) = state.registry.get(&focus.key) else {
        return;
    };
    let cell = match direction {
        Direction::Backward => 0,
        Direction::Forward => entry.grid.cell_count().saturating_sub(1),
    };
    state.focus = Some(Focus { cell, ..focus });
}

/// Jump focus a whole card forward or backward, landing on the first cell.
/// No wrap-around at either end. Ignored while a scroll animation is in
/// flight, like [`advance_cell`].
pub fn advance_card(state: &mut AppState, direction: Direction) {
    if state.nav_state.in_flight() {
        debug!("card navigation suppressed: scroll animation in flight");
        return;
    }
    let Some(focus) = state.focus.clone() else {
        state.ensure_focus();
        return;
    };
    let Some(pos) = state.registry.position(&focus.key) else {
        return;
    };
    let neighbor = match direction {
        Direction::Forward => pos + 1,
        Direction::Backward => match pos.checked_sub(1) {
            Some(p) => p,
            None => return,
        },
    };
    let Some(key) = state.registry.key_at(neighbor).map(str::to_string) else {
        return;
    };
    jump_to_card(state, Focus { key, cell: 0 });
}

/// Confirm the highlighted key in the navigation index: scroll its card to a
/// comfortable position (or not at all, if it already sits in the center
/// band) and focus its first cell.
pub fn select_from_nav(state: &mut AppState) {
    let Some(key) = state.registry.key_at(state.nav_selected).map(str::to_string) else {
        return;
    };
    state.ui_mode = UiMode::Detail;
    let focus = Focus { key: key.clone(), cell: 0 };

    let target = state
        .viewport
        .extent_of(&key)
        .and_then(|extent| comfortable_target(extent, &state.viewport, state.scroll_offset));
    match target {
        Some(target) => {
            state.nav_state = NavState::ScrollPending { target, focus };
        }
        None => {
            state.focus = Some(focus);
            state.nav_state = NavState::Idle;
        }
    }
}

/// Advance the scroll animation one step. Applies the pending focus and
/// releases the in-flight guard when the target offset is reached.
pub fn tick(state: &mut AppState) {
    let NavState::ScrollPending { target, focus } = state.nav_state.clone() else {
        return;
    };
    // Content can shrink while the animation runs (keys removed, cards
    // rebuilt smaller). The renderer clamps the live offset to the new
    // scroll range every frame, so a target beyond that range would never
    // be reached and the guard would never release. Clamp it too.
    let target = target.min(state.viewport.max_scroll());

    let current = state.scroll_offset;
    if current == target {
        state.focus = Some(focus);
        state.nav_state = NavState::Idle;
        return;
    }

    let distance = current.abs_diff(target);
    let step = (distance / SCROLL_STEP_DIVISOR).max(1);
    state.scroll_offset = if target > current {
        current + step.min(distance)
    } else {
        current - step.min(distance)
    };

    if state.scroll_offset == target {
        state.focus = Some(focus);
        state.nav_state = NavState::Idle;
    }
}

/// Focus `focus`'s card, scrolling first when it is outside the viewport.
fn jump_to_card(state: &mut AppState, focus: Focus) {
    let target = state.viewport.extent_of(&focus.key).and_then(|extent| {
        if is_fully_visible(extent, state.scroll_offset, state.viewport.height) {
            None
        } else {
            comfortable_target(extent, &state.viewport, state.scroll_offset)
                .or(Some(state.scroll_offset))
        }
    });
    match target {
        Some(target) if target != state.scroll_offset => {
            state.nav_state = NavState::ScrollPending { target, focus };
        }
        _ => {
            state.focus = Some(focus);
        }
    }
}

fn is_fully_visible(extent: &CardExtent, scroll: usize, viewport_height: usize) -> bool {
    extent.top >= scroll && extent.top + extent.height <= scroll + viewport_height
}

/// Compute the comfortable scroll offset for a card, or `None` when no
/// scroll should happen.
///
/// The target centers the card in the viewport, clamped to the content's
/// scroll range - which degenerates to top-alignment near the top of content
/// and bottom-alignment near the bottom. A card already lying wholly within
/// the center band of the viewport (one sixth of the height in from either
/// edge) produces no scroll at all.
pub fn comfortable_target(
    extent: &CardExtent,
    viewport: &ViewportState,
    scroll: usize,
) -> Option<usize> {
    let height = viewport.height;
    if height == 0 {
        return None;
    }

    let margin = height / BAND_DIVISOR;
    let band_top = scroll + margin;
    let band_bottom = (scroll + height).saturating_sub(margin);
    if extent.top >= band_top && extent.top + extent.height <= band_bottom {
        return None;
    }

    let centered = (extent.top + extent.height / 2)
        .saturating_sub(height / 2)
        .min(viewport.max_scroll());
    (centered != scroll).then_some(centered)
}
