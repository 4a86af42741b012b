//! Grid math - cell mapping and 2-D navigation for composites with `cols > 1`.
//!
//! Everything here is pure and DOM-free:
//!
//! - [`build_cell_map`] packs items of arbitrary `width × height` (in cells)
//!   into a row-major grid of `cols` columns.
//! - [`cell_index_of_corner`] / [`cell_indices`] translate item indices to cells.
//! - [`grid_navigated_index`] moves one step through the cell map, treating
//!   empty cells and cells of disabled items as impassable.
//!
//! Indices passed between these helpers are `isize` so that "nothing
//! highlighted" (`-1`) and out-of-range scan positions can be represented while
//! scanning; callers convert to `Option<usize>` at the boundary.

use tracing::warn;

use crate::state::keyboard::{ARROW_DOWN, ARROW_LEFT, ARROW_RIGHT, ARROW_UP};
use crate::types::{ItemSize, Orientation};

// =============================================================================
// Cell Map
// =============================================================================

/// Place items (in index order) into a grid of `cols` columns.
///
/// Each slot of the result holds the index of the item covering that cell,
/// or `None` for gaps. The map is padded to whole rows.
///
/// - `dense = false`: each item is placed at the first slot at or after the
///   previous item's position where it fits without wrapping its row.
/// - `dense = true`: each item is placed at the earliest slot in the whole
///   grid where it fits.
///
/// Zero sizes count as one cell. Items wider than the grid cannot be placed;
/// their cells stay `None`.
pub fn build_cell_map(sizes: &[ItemSize], cols: usize, dense: bool) -> Vec<Option<usize>> {
    let cols = cols.max(1);
    let mut cell_map: Vec<Option<usize>> = Vec::new();
    let mut start = 0usize;

    for (index, size) in sizes.iter().enumerate() {
        let width = size.width.max(1);
        let height = size.height.max(1);

        if width > cols {
            warn!(index, width, cols, "grid item is wider than the grid; leaving it unplaced");
            continue;
        }

        if dense {
            start = 0;
        }

        loop {
            let fits_row = start % cols + width <= cols;
            let free = fits_row
                && (0..height).all(|row| {
                    (0..width).all(|col| {
                        cell_map
                            .get(start + col + row * cols)
                            .copied()
                            .flatten()
                            .is_none()
                    })
                });

            if free {
                for row in 0..height {
                    for col in 0..width {
                        let cell = start + col + row * cols;
                        if cell >= cell_map.len() {
                            cell_map.resize(cell + 1, None);
                        }
                        cell_map[cell] = Some(index);
                    }
                }
                break;
            }

            start += 1;
        }
    }

    let rows = cell_map.len().div_ceil(cols);
    cell_map.resize(rows * cols, None);
    cell_map
}

/// Corner of a multi-cell item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Cell occupied by the given corner of item `index`, or `None` if the item
/// is not in the map.
pub fn cell_index_of_corner(
    index: usize,
    sizes: &[ItemSize],
    cell_map: &[Option<usize>],
    cols: usize,
    corner: Corner,
) -> Option<usize> {
    let first = cell_map.iter().position(|&cell| cell == Some(index))?;
    let Some(size) = sizes.get(index) else {
        return Some(first);
    };

    match corner {
        Corner::TopLeft => Some(first),
        Corner::TopRight => Some(first + size.width.max(1) - 1),
        Corner::BottomLeft => Some(first + (size.height.max(1) - 1) * cols.max(1)),
        Corner::BottomRight => cell_map.iter().rposition(|&cell| cell == Some(index)),
    }
}

/// All cells covered by any of `items`.
pub fn cell_indices(items: &[usize], cell_map: &[Option<usize>]) -> Vec<usize> {
    cell_map
        .iter()
        .enumerate()
        .filter_map(|(cell, item)| item.filter(|i| items.contains(i)).map(|_| cell))
        .collect()
}

// =============================================================================
// Scanning
// =============================================================================

/// Step from `start` by `amount` (backwards if `decrement`) until an index is
/// either out of `0..len` or not disabled, and return it.
///
/// An out-of-range result means nothing enabled lies in that direction.
pub fn find_non_disabled_index(
    len: usize,
    start: isize,
    decrement: bool,
    amount: usize,
    is_disabled: &dyn Fn(usize) -> bool,
) -> isize {
    let step = amount.max(1) as isize;
    let len = len as isize;
    let mut index = start;
    loop {
        index += if decrement { -step } else { step };
        if index < 0 || index >= len || !is_disabled(index as usize) {
            return index;
        }
    }
}

fn out_of_bounds(index: isize, len: usize) -> bool {
    index < 0 || index >= len as isize
}

// =============================================================================
// Grid Navigation
// =============================================================================

/// One navigation request against a cell map.
#[derive(Debug, Clone, Copy)]
pub struct GridMove<'a> {
    pub key: &'a str,
    pub orientation: Orientation,
    pub loop_focus: bool,
    pub rtl: bool,
    pub cols: usize,
    /// First enabled cell.
    pub min_index: isize,
    /// Last enabled cell.
    pub max_index: isize,
    /// Cell the move starts from (`-1` for none).
    pub prev_index: isize,
}

/// Cell reached by applying `mv` to a grid of `len` cells.
///
/// Returns `mv.prev_index` when the move is blocked. Vertical moves step by
/// whole rows and may wrap columns when looping; horizontal moves stay on the
/// current row, wrapping within it when looping (the last row wraps to the
/// first enabled cell overall).
pub fn grid_navigated_index(len: usize, mv: &GridMove<'_>, is_disabled: &dyn Fn(usize) -> bool) -> isize {
    let cols = mv.cols.max(1) as isize;
    let prev = mv.prev_index;
    let (min, max) = (mv.min_index, mv.max_index);
    let find = |start: isize, decrement: bool, amount: usize| {
        find_non_disabled_index(len, start, decrement, amount, is_disabled)
    };
    let mut next = prev;

    if mv.key == ARROW_UP && mv.orientation.allows_vertical() {
        if prev == -1 {
            next = max;
        } else {
            next = find(prev, true, cols as usize);
            if mv.loop_focus && (prev - cols < min || next < 0) {
                let col = prev % cols;
                let max_col = max % cols;
                let offset = max - (max_col - col);
                next = if max_col == col {
                    max
                } else if max_col > col {
                    offset
                } else {
                    offset - cols
                };
            }
        }
        if out_of_bounds(next, len) {
            next = prev;
        }
    }

    if mv.key == ARROW_DOWN && mv.orientation.allows_vertical() {
        if prev == -1 {
            next = min;
        } else {
            next = find(prev, false, cols as usize);
            if mv.loop_focus && prev + cols > max {
                next = find(prev % cols - cols, false, cols as usize);
            }
        }
        if out_of_bounds(next, len) {
            next = prev;
        }
    }

    let forward = if mv.rtl { ARROW_LEFT } else { ARROW_RIGHT };
    let backward = if mv.rtl { ARROW_RIGHT } else { ARROW_LEFT };

    if mv.orientation.allows_horizontal() && (mv.key == forward || mv.key == backward) {
        let prev_row = prev.div_euclid(cols);
        let different_row = |index: isize| index.div_euclid(cols) != prev_row;
        let row_start = prev - prev % cols;

        if mv.key == forward {
            if prev % cols != cols - 1 {
                next = find(prev, false, 1);
                if mv.loop_focus && different_row(next) {
                    next = find(row_start - 1, false, 1);
                }
            } else if mv.loop_focus {
                next = find(row_start - 1, false, 1);
            }
            if different_row(next) {
                next = prev;
            }
        } else {
            if prev % cols != 0 {
                next = find(prev, true, 1);
                if mv.loop_focus && different_row(next) {
                    next = find(row_start + cols, true, 1);
                }
            } else if mv.loop_focus {
                next = find(row_start + cols, true, 1);
            }
            if different_row(next) {
                next = prev;
            }
        }

        let last_row = max.div_euclid(cols) == prev_row;
        if out_of_bounds(next, len) {
            next = if mv.loop_focus && last_row {
                if mv.key == backward {
                    max
                } else {
                    find(row_start - 1, false, 1)
                }
            } else {
                prev
            };
        }
    }

    next
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_sizes(count: usize) -> Vec<ItemSize> {
        vec![ItemSize::UNIT; count]
    }

    fn never_disabled(_: usize) -> bool {
        false
    }

    fn step(key: &str, prev: isize, cell_map: &[Option<usize>], cols: usize, loop_focus: bool) -> isize {
        let disabled = |cell: usize| cell_map.get(cell).copied().flatten().is_none();
        let min = find_non_disabled_index(cell_map.len(), -1, false, 1, &disabled);
        let max = find_non_disabled_index(cell_map.len(), cell_map.len() as isize, true, 1, &disabled);
        grid_navigated_index(
            cell_map.len(),
            &GridMove {
                key,
                orientation: Orientation::Both,
                loop_focus,
                rtl: false,
                cols,
                min_index: min,
                max_index: max,
                prev_index: prev,
            },
            &disabled,
        )
    }

    #[test]
    fn test_uniform_map_is_identity() {
        let map = build_cell_map(&unit_sizes(9), 3, false);
        assert_eq!(map, (0..9).map(Some).collect::<Vec<_>>());
    }

    #[test]
    fn test_ragged_tail_is_padded() {
        let map = build_cell_map(&unit_sizes(7), 3, false);
        assert_eq!(map.len(), 9);
        assert_eq!(&map[6..], &[Some(6), None, None]);
    }

    #[test]
    fn test_multi_cell_item_placement() {
        let sizes = [
            ItemSize::new(2, 2),
            ItemSize::UNIT,
            ItemSize::UNIT,
            ItemSize::UNIT,
            ItemSize::UNIT,
        ];
        let map = build_cell_map(&sizes, 3, false);
        assert_eq!(
            map,
            vec![Some(0), Some(0), Some(1), Some(0), Some(0), Some(2), Some(3), Some(4), None]
        );
    }

    #[test]
    fn test_dense_backfills_gaps() {
        let sizes = [ItemSize::UNIT, ItemSize::new(3, 1), ItemSize::UNIT];

        let sparse = build_cell_map(&sizes, 3, false);
        assert_eq!(
            sparse,
            vec![Some(0), None, None, Some(1), Some(1), Some(1), Some(2), None, None]
        );

        let dense = build_cell_map(&sizes, 3, true);
        assert_eq!(dense, vec![Some(0), Some(2), None, Some(1), Some(1), Some(1)]);
    }

    #[test]
    fn test_malformed_sizes_terminate() {
        let sizes = [ItemSize::new(5, 1), ItemSize::new(0, 0), ItemSize::UNIT];
        let map = build_cell_map(&sizes, 2, false);
        assert!(!map.contains(&Some(0)));
        assert_eq!(map, vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_corners() {
        let sizes = [ItemSize::new(2, 2), ItemSize::UNIT];
        let map = build_cell_map(&sizes, 3, false);

        assert_eq!(cell_index_of_corner(0, &sizes, &map, 3, Corner::TopLeft), Some(0));
        assert_eq!(cell_index_of_corner(0, &sizes, &map, 3, Corner::TopRight), Some(1));
        assert_eq!(cell_index_of_corner(0, &sizes, &map, 3, Corner::BottomLeft), Some(3));
        assert_eq!(cell_index_of_corner(0, &sizes, &map, 3, Corner::BottomRight), Some(4));
        assert_eq!(cell_index_of_corner(7, &sizes, &map, 3, Corner::TopLeft), None);
    }

    #[test]
    fn test_cell_indices() {
        let sizes = [ItemSize::new(2, 2), ItemSize::UNIT];
        let map = build_cell_map(&sizes, 3, false);
        assert_eq!(cell_indices(&[0], &map), vec![0, 1, 3, 4]);
        assert_eq!(cell_indices(&[1], &map), vec![2]);
    }

    #[test]
    fn test_find_non_disabled_skips() {
        let disabled = |i: usize| i == 1;
        assert_eq!(find_non_disabled_index(3, 0, false, 1, &disabled), 2);
        assert_eq!(find_non_disabled_index(3, 2, false, 1, &disabled), 3);
        assert_eq!(find_non_disabled_index(3, 2, true, 1, &disabled), 0);
        assert_eq!(find_non_disabled_index(3, -1, false, 1, &never_disabled), 0);
    }

    #[test]
    fn test_uniform_grid_moves() {
        let map = build_cell_map(&unit_sizes(9), 3, false);
        assert_eq!(step(ARROW_DOWN, 0, &map, 3, false), 3);
        assert_eq!(step(ARROW_RIGHT, 3, &map, 3, false), 4);
        assert_eq!(step(ARROW_DOWN, 4, &map, 3, false), 7);
        assert_eq!(step(ARROW_UP, 4, &map, 3, false), 1);
        assert_eq!(step(ARROW_LEFT, 4, &map, 3, false), 3);
    }

    #[test]
    fn test_edges_block_without_loop() {
        let map = build_cell_map(&unit_sizes(9), 3, false);
        assert_eq!(step(ARROW_UP, 1, &map, 3, false), 1);
        assert_eq!(step(ARROW_DOWN, 7, &map, 3, false), 7);
        assert_eq!(step(ARROW_RIGHT, 2, &map, 3, false), 2);
        assert_eq!(step(ARROW_LEFT, 3, &map, 3, false), 3);
    }

    #[test]
    fn test_edges_wrap_with_loop() {
        let map = build_cell_map(&unit_sizes(9), 3, false);
        assert_eq!(step(ARROW_DOWN, 7, &map, 3, true), 1);
        assert_eq!(step(ARROW_UP, 1, &map, 3, true), 7);
        assert_eq!(step(ARROW_RIGHT, 5, &map, 3, true), 3);
        assert_eq!(step(ARROW_LEFT, 3, &map, 3, true), 5);
    }

    #[test]
    fn test_empty_cells_are_impassable() {
        // 7 items in 3 columns: cells 7 and 8 are empty.
        let map = build_cell_map(&unit_sizes(7), 3, false);
        assert_eq!(step(ARROW_DOWN, 4, &map, 3, false), 4);
        assert_eq!(step(ARROW_RIGHT, 6, &map, 3, false), 6);
    }

    #[test]
    fn test_rtl_mirrors_horizontal() {
        let map = build_cell_map(&unit_sizes(9), 3, false);
        let disabled = |cell: usize| map[cell].is_none();
        let mv = GridMove {
            key: ARROW_LEFT,
            orientation: Orientation::Both,
            loop_focus: false,
            rtl: true,
            cols: 3,
            min_index: 0,
            max_index: 8,
            prev_index: 4,
        };
        assert_eq!(grid_navigated_index(9, &mv, &disabled), 5);
    }
}
