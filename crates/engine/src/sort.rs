//! Stable, type-aware column sorting.
//!
//! Sorting never touches cell data; it produces a new row permutation for
//! the grid to apply. Comparison policy (documented, not accidental):
//!
//! - Kind rank: Empty < Number < Date < Boolean < Text
//! - Unreadable markers rank with Text and compare by display string
//! - Numbers and date serials compare numerically, booleans false < true,
//!   text compares by locale-neutral lexicographic order on the display
//! - Descending inverts the key comparison only, never the tie-break, so
//!   equal rows keep their relative order in both directions

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Next state in the header-activation cycle:
    /// unsorted -> Ascending -> Descending -> unsorted.
    pub fn cycle(current: Option<SortDirection>) -> Option<SortDirection> {
        match current {
            None => Some(SortDirection::Ascending),
            Some(SortDirection::Ascending) => Some(SortDirection::Descending),
            Some(SortDirection::Descending) => None,
        }
    }
}

/// Active sort, at most one per grid. Absence means original load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: usize,
    pub direction: SortDirection,
}

fn kind_rank(kind: &CellKind) -> u8 {
    match kind {
        CellKind::Empty => 0,
        CellKind::Number(_) => 1,
        CellKind::Date(_) => 2,
        CellKind::Boolean(_) => 3,
        CellKind::Text | CellKind::Unreadable => 4,
    }
}

/// Compare two cells under the column sort policy (ascending sense).
pub fn compare_cells(a: &Cell, b: &Cell) -> Ordering {
    let rank = kind_rank(&a.kind).cmp(&kind_rank(&b.kind));
    if rank != Ordering::Equal {
        return rank;
    }
    match (&a.kind, &b.kind) {
        (CellKind::Empty, CellKind::Empty) => Ordering::Equal,
        (CellKind::Number(x), CellKind::Number(y)) => x.cmp(y),
        (CellKind::Date(x), CellKind::Date(y)) => x.cmp(y),
        (CellKind::Boolean(x), CellKind::Boolean(y)) => x.cmp(y),
        // Text vs Unreadable share a rank; both fall through to display
        _ => a.display.cmp(&b.display),
    }
}

/// Stable-sort `rows` (data-row indices, in current view order) by `column`.
///
/// `cells` is the full row-major grid; `rows` is reordered in place.
/// Rows whose keys compare equal retain their incoming relative order.
pub fn sort_rows(
    cells: &[Vec<Cell>],
    rows: &mut [usize],
    column: usize,
    direction: SortDirection,
) {
    static EMPTY: Cell = Cell {
        display: String::new(),
        kind: CellKind::Empty,
    };
    let cell_at = |row: usize| -> &Cell {
        cells
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY)
    };
    rows.sort_by(|&a, &b| {
        let ord = compare_cells(cell_at(a), cell_at(b));
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}
