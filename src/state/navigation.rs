//! Navigation - the key → highlighted-index transition.
//!
//! [`next_highlighted_index`] is the whole state machine, free of any DOM:
//! given the navigation settings, the number of items, which of them are
//! disabled and what is highlighted now, it returns the index a key press
//! moves to (or `None` when the press is a no-op).
//!
//! Linear mode (`cols <= 1`) steps through items, skipping disabled ones and
//! wrapping at the ends when looping. Grid mode (`cols > 1`) maps items onto
//! cells (see [`grid`](super::grid)) and moves by row/column.

use crate::engine::TextInputState;
use crate::state::grid::{
    Corner, GridMove, build_cell_map, cell_index_of_corner, find_non_disabled_index,
    grid_navigated_index,
};
use crate::state::keyboard::{ARROW_DOWN, ARROW_LEFT, ARROW_RIGHT, ARROW_UP, END, HOME, ModifierKeys};
use crate::types::{ItemSize, Orientation, TextDirection};

// =============================================================================
// Config
// =============================================================================

/// Navigation settings of a composite root.
///
/// Defaults: both orientations, one column, looping, sparse packing, no
/// Home/End, left-to-right, no modifiers allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavigationConfig {
    pub orientation: Orientation,
    /// Columns; more than one switches to grid navigation.
    pub cols: usize,
    /// Wrap at the ends.
    #[cfg_attr(feature = "serde", serde(rename = "loop"))]
    pub loop_focus: bool,
    /// Grid packing: backfill gaps instead of always moving forward.
    pub dense: bool,
    pub enable_home_and_end_keys: bool,
    pub direction: TextDirection,
    /// Modifiers that may be held without cancelling navigation.
    pub modifier_keys: ModifierKeys,
    pub stop_event_propagation: bool,
    pub highlight_item_on_hover: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Both,
            cols: 1,
            loop_focus: true,
            dense: false,
            enable_home_and_end_keys: false,
            direction: TextDirection::Ltr,
            modifier_keys: ModifierKeys::empty(),
            stop_event_propagation: false,
            highlight_item_on_hover: false,
        }
    }
}

impl NavigationConfig {
    pub fn is_grid(&self) -> bool {
        self.cols > 1
    }

    pub fn is_rtl(&self) -> bool {
        self.direction.is_rtl()
    }

    /// Physical key that moves forward along a row.
    pub fn horizontal_forward_key(&self) -> &'static str {
        if self.is_rtl() { ARROW_LEFT } else { ARROW_RIGHT }
    }

    /// Physical key that moves backward along a row.
    pub fn horizontal_backward_key(&self) -> &'static str {
        if self.is_rtl() { ARROW_RIGHT } else { ARROW_LEFT }
    }

    /// Keys that advance the highlight, horizontal first.
    pub fn forward_keys(&self) -> Vec<&'static str> {
        match self.orientation {
            Orientation::Horizontal => vec![self.horizontal_forward_key()],
            Orientation::Vertical => vec![ARROW_DOWN],
            Orientation::Both => vec![self.horizontal_forward_key(), ARROW_DOWN],
        }
    }

    /// Keys that move the highlight back, horizontal first.
    pub fn backward_keys(&self) -> Vec<&'static str> {
        match self.orientation {
            Orientation::Horizontal => vec![self.horizontal_backward_key()],
            Orientation::Vertical => vec![ARROW_UP],
            Orientation::Both => vec![self.horizontal_backward_key(), ARROW_UP],
        }
    }

    /// Does the composite handle `key` at all? Everything else passes
    /// through untouched.
    pub fn is_relevant_key(&self, key: &str) -> bool {
        self.forward_keys().contains(&key)
            || self.backward_keys().contains(&key)
            || (self.enable_home_and_end_keys && (key == HOME || key == END))
    }
}

// =============================================================================
// Text Input Gating
// =============================================================================

/// Should a key pressed inside a text control navigate, or move the caret?
///
/// Navigation only takes over when the selection is collapsed, shift is not
/// held and the caret already sits at the edge the key points to: the end
/// for forward keys (and End), the start for backward keys (and Home).
pub fn caret_allows_navigation(
    config: &NavigationConfig,
    key: &str,
    input: &TextInputState,
    shift: bool,
) -> bool {
    if shift {
        return false;
    }
    let Some(caret) = input.caret() else {
        return false;
    };

    let forward = key == END || config.forward_keys().contains(&key);
    let backward = key == HOME || config.backward_keys().contains(&key);

    (!forward || caret >= input.len()) && (!backward || caret == 0)
}

// =============================================================================
// Transition
// =============================================================================

/// Inputs of one navigation step.
#[derive(Debug, Clone, Copy)]
pub struct NavigationRequest<'a> {
    pub key: &'a str,
    pub config: &'a NavigationConfig,
    pub highlighted: Option<usize>,
    pub len: usize,
    /// Per-item sizes in cells (grid mode). Missing entries are 1×1.
    pub item_sizes: Option<&'a [ItemSize]>,
}

/// Index the key moves the highlight to, or `None` if nothing changes.
///
/// Never returns a disabled index, an out-of-range index or the current one.
pub fn next_highlighted_index(request: &NavigationRequest<'_>, is_disabled: &dyn Fn(usize) -> bool) -> Option<usize> {
    let len = request.len;
    let config = request.config;
    if len == 0 || !config.is_relevant_key(request.key) {
        return None;
    }

    let forward = config.forward_keys().contains(&request.key);
    let backward = config.backward_keys().contains(&request.key);
    let current = request
        .highlighted
        .filter(|&index| index < len)
        .map_or(-1, |index| index as isize);

    let min = find_non_disabled_index(len, -1, false, 1, is_disabled);
    let max = find_non_disabled_index(len, len as isize, true, 1, is_disabled);

    let mut next = current;

    if config.is_grid() {
        if forward || backward {
            next = grid_step(request, current, min, max, forward, is_disabled);
        }
    } else if forward || backward {
        next = if current < 0 {
            if forward { min } else { max }
        } else {
            let stepped = find_non_disabled_index(len, current, backward, 1, is_disabled);
            if (stepped < 0 || stepped >= len as isize) && config.loop_focus {
                if forward { min } else { max }
            } else {
                stepped
            }
        };
    }

    if config.enable_home_and_end_keys {
        if request.key == HOME {
            next = min;
        } else if request.key == END {
            next = max;
        }
    }

    if next < 0 || next >= len as isize {
        return None;
    }
    let next = next as usize;
    if is_disabled(next) || Some(next) == request.highlighted {
        return None;
    }
    Some(next)
}

fn grid_step(
    request: &NavigationRequest<'_>,
    current: isize,
    min: isize,
    max: isize,
    forward: bool,
    is_disabled: &dyn Fn(usize) -> bool,
) -> isize {
    let config = request.config;
    let cols = config.cols;
    let sizes: Vec<ItemSize> = (0..request.len)
        .map(|index| {
            request
                .item_sizes
                .and_then(|sizes| sizes.get(index).copied())
                .unwrap_or(ItemSize::UNIT)
        })
        .collect();

    let cell_map = build_cell_map(&sizes, cols, config.dense);
    let cell_disabled = |cell: usize| {
        cell_map
            .get(cell)
            .copied()
            .flatten()
            .is_none_or(|item| is_disabled(item))
    };

    let Some(min_cell) = (0..cell_map.len()).position(|cell| !cell_disabled(cell)) else {
        return current;
    };
    let Some(max_cell) = (0..cell_map.len()).rposition(|cell| !cell_disabled(cell)) else {
        return current;
    };

    let origin = if current > max { min } else { current };
    let corner = if request.key == ARROW_DOWN {
        Corner::BottomLeft
    } else if request.key == config.horizontal_forward_key() {
        Corner::TopRight
    } else {
        Corner::TopLeft
    };
    let prev_cell = if origin < 0 {
        None
    } else {
        cell_index_of_corner(origin as usize, &sizes, &cell_map, cols, corner)
    };

    let cell = match prev_cell {
        None => {
            if forward {
                min_cell as isize
            } else {
                max_cell as isize
            }
        }
        Some(prev_cell) => grid_navigated_index(
            cell_map.len(),
            &GridMove {
                key: request.key,
                orientation: config.orientation,
                loop_focus: config.loop_focus,
                rtl: config.is_rtl(),
                cols,
                min_index: min_cell as isize,
                max_index: max_cell as isize,
                prev_index: prev_cell as isize,
            },
            &cell_disabled,
        ),
    };

    if cell < 0 {
        return current;
    }
    cell_map
        .get(cell as usize)
        .copied()
        .flatten()
        .map_or(current, |item| item as isize)
}

/// Enabled index closest to `around`, clamped into `0..len`. Ties go to the
/// lower index. `None` when every item is disabled or the list is empty.
pub fn nearest_enabled_index(len: usize, around: usize, is_disabled: &dyn Fn(usize) -> bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let start = around.min(len - 1);
    (0..len).find_map(|distance| {
        let below = start.checked_sub(distance).filter(|&index| !is_disabled(index));
        below.or_else(|| Some(start + distance).filter(|&index| index < len && !is_disabled(index)))
    })
}

// =============================================================================
// TESTS
// =============================================================================
