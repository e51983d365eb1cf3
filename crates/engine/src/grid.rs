//! Grid presentation model: the single source of truth for what the user
//! currently sees. Owns the cells, the display-order permutation, column
//! widths, the active sort, the row filter, and the highlighted cell, and
//! keeps them mutually consistent after every operation.

use crate::cell::Cell;
use crate::layout;
use crate::sort::{self, SortDirection, SortState};

/// The single cell eligible for highlight, in display coordinates.
/// Never a range, never a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightTarget {
    pub row: usize,
    pub col: usize,
}

pub struct Grid {
    /// Row-major cells in original load order. Never reordered or mutated
    /// after construction; sorting only permutes `view`.
    cells: Vec<Vec<Cell>>,
    col_names: Vec<String>,
    /// Computed once per build; sort-invariant by construction.
    widths: Vec<usize>,
    /// Display row -> data row. Identity when unsorted and unfiltered.
    view: Vec<usize>,
    sort: Option<SortState>,
    filter: String,
    highlight: Option<HighlightTarget>,
}

impl Grid {
    /// Build a grid from normalized cells. Rows must already be padded to
    /// a uniform column count (the io layer guarantees this).
    pub fn new(col_names: Vec<String>, cells: Vec<Vec<Cell>>, max_col_width: usize) -> Self {
        let widths = layout::compute_widths(&col_names, &cells, max_col_width);
        let view = (0..cells.len()).collect();
        Grid {
            cells,
            col_names,
            widths,
            view,
            sort: None,
            filter: String::new(),
            highlight: None,
        }
    }

    pub fn num_cols(&self) -> usize {
        self.col_names.len()
    }

    /// Rows in the underlying sheet, ignoring the filter.
    pub fn total_rows(&self) -> usize {
        self.cells.len()
    }

    /// Rows currently visible.
    pub fn display_rows(&self) -> usize {
        self.view.len()
    }

    pub fn col_name(&self, col: usize) -> &str {
        self.col_names.get(col).map(|s| s.as_str()).unwrap_or("?")
    }

    pub fn column_width(&self, col: usize) -> usize {
        self.widths
            .get(col)
            .copied()
            .unwrap_or(layout::MIN_COL_WIDTH)
    }

    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    /// Cell at display coordinates, resolved through the permutation.
    pub fn cell_at(&self, display_row: usize, col: usize) -> Option<&Cell> {
        let data_row = *self.view.get(display_row)?;
        self.cells.get(data_row)?.get(col)
    }

    /// 1-based source row number for a display row (what the gutter shows).
    pub fn file_row(&self, display_row: usize) -> Option<usize> {
        self.view.get(display_row).map(|&r| r + 1)
    }

    pub fn sort_state(&self) -> Option<SortState> {
        self.sort
    }

    /// Header activation: first click on a column sorts Ascending, second
    /// Descending, third returns to original load order. Clicking a
    /// different column starts its cycle fresh at Ascending.
    pub fn header_click(&mut self, col: usize) {
        if col >= self.num_cols() {
            return;
        }
        let current = match self.sort {
            Some(s) if s.column == col => Some(s.direction),
            _ => None,
        };
        self.sort = SortDirection::cycle(current).map(|direction| SortState {
            column: col,
            direction,
        });
        self.rebuild_view();
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Case-insensitive substring filter over whole rows. The active sort
    /// is re-applied to the surviving rows.
    pub fn set_filter(&mut self, text: &str) {
        self.filter = text.to_string();
        self.rebuild_view();
    }

    pub fn clear_filter(&mut self) {
        if !self.filter.is_empty() {
            self.filter.clear();
            self.rebuild_view();
        }
    }

    pub fn highlight(&self) -> Option<HighlightTarget> {
        self.highlight
    }

    /// Out-of-range targets are rejected rather than stored dangling.
    pub fn set_highlight(&mut self, row: usize, col: usize) {
        if row < self.view.len() && col < self.num_cols() {
            self.highlight = Some(HighlightTarget { row, col });
        } else {
            self.highlight = None;
        }
    }

    pub fn clear_highlight(&mut self) {
        self.highlight = None;
    }

    fn rebuild_view(&mut self) {
        let needle = self.filter.trim().to_lowercase();
        self.view = (0..self.cells.len())
            .filter(|&r| {
                needle.is_empty()
                    || self.cells[r]
                        .iter()
                        .any(|cell| cell.display.to_lowercase().contains(&needle))
            })
            .collect();

        if let Some(SortState { column, direction }) = self.sort {
            sort::sort_rows(&self.cells, &mut self.view, column, direction);
        }

        // A highlight that fell off the visible area is cleared, never left
        // pointing at stale coordinates
        if let Some(h) = self.highlight {
            if h.row >= self.view.len() || h.col >= self.num_cols() {
                self.highlight = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{CellKind, RawPayload};

    fn grid_from(rows: Vec<Vec<RawPayload>>) -> Grid {
        let num_cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let cells: Vec<Vec<Cell>> = rows
            .into_iter()
            .map(|row| {
                let mut out: Vec<Cell> = row.into_iter().map(Cell::normalize).collect();
                out.resize(num_cols, Cell::empty());
                out
            })
            .collect();
        let names = (0..num_cols).map(crate::util::col_to_letter).collect();
        Grid::new(names, cells, layout::DEFAULT_MAX_COL_WIDTH)
    }

    fn text(s: &str) -> RawPayload {
        RawPayload::Text(s.to_string())
    }

    fn sample() -> Grid {
        grid_from(vec![
            vec![RawPayload::Number(10.0), text("banana")],
            vec![text("apple"), text("pear")],
            vec![RawPayload::Number(2.0), text("fig")],
            vec![RawPayload::Empty, text("kiwi")],
        ])
    }

    fn display_col(grid: &Grid, col: usize) -> Vec<String> {
        (0..grid.display_rows())
            .map(|r| grid.cell_at(r, col).unwrap().display.clone())
            .collect()
    }

    #[test]
    fn unsorted_view_is_load_order() {
        let grid = sample();
        assert_eq!(display_col(&grid, 0), vec!["10", "apple", "2", ""]);
        assert_eq!(grid.file_row(0), Some(1));
        assert_eq!(grid.file_row(3), Some(4));
    }

    #[test]
    fn header_click_cycles_and_restores_load_order() {
        let mut grid = sample();
        let original = display_col(&grid, 0);

        grid.header_click(0);
        assert_eq!(
            grid.sort_state(),
            Some(SortState {
                column: 0,
                direction: SortDirection::Ascending
            })
        );
        assert_eq!(display_col(&grid, 0), vec!["", "2", "10", "apple"]);

        grid.header_click(0);
        assert_eq!(display_col(&grid, 0), vec!["apple", "10", "2", ""]);

        grid.header_click(0);
        assert_eq!(grid.sort_state(), None);
        assert_eq!(display_col(&grid, 0), original);
    }

    #[test]
    fn clicking_new_column_starts_ascending() {
        let mut grid = sample();
        grid.header_click(0);
        grid.header_click(0); // col 0 descending
        grid.header_click(1); // fresh column
        assert_eq!(
            grid.sort_state(),
            Some(SortState {
                column: 1,
                direction: SortDirection::Ascending
            })
        );
        assert_eq!(display_col(&grid, 1), vec!["banana", "fig", "kiwi", "pear"]);
    }

    #[test]
    fn sort_is_a_pure_permutation() {
        let mut grid = sample();
        let mut before: Vec<String> = (0..grid.display_rows())
            .flat_map(|r| (0..grid.num_cols()).map(move |c| (r, c)))
            .map(|(r, c)| grid.cell_at(r, c).unwrap().display.clone())
            .collect();
        grid.header_click(0);
        let mut after: Vec<String> = (0..grid.display_rows())
            .flat_map(|r| (0..grid.num_cols()).map(move |c| (r, c)))
            .map(|(r, c)| grid.cell_at(r, c).unwrap().display.clone())
            .collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn widths_invariant_under_sort() {
        let mut grid = sample();
        let before = grid.widths().to_vec();
        grid.header_click(0);
        assert_eq!(grid.widths(), &before[..]);
        grid.header_click(0);
        assert_eq!(grid.widths(), &before[..]);
    }

    #[test]
    fn rows_follow_sort_as_units() {
        let mut grid = sample();
        grid.header_click(0);
        // "2" came from row 3 of the file alongside "fig"
        assert_eq!(grid.cell_at(1, 0).unwrap().display, "2");
        assert_eq!(grid.cell_at(1, 1).unwrap().display, "fig");
        assert_eq!(grid.file_row(1), Some(3));
    }

    #[test]
    fn filter_narrows_and_clears() {
        let mut grid = sample();
        grid.set_filter("fig");
        assert_eq!(grid.display_rows(), 1);
        assert_eq!(grid.cell_at(0, 1).unwrap().display, "fig");
        grid.clear_filter();
        assert_eq!(grid.display_rows(), 4);
    }

    #[test]
    fn filter_is_case_insensitive() {
        let mut grid = sample();
        grid.set_filter("FIG");
        assert_eq!(grid.display_rows(), 1);
    }

    #[test]
    fn sort_survives_filter_changes() {
        let mut grid = sample();
        grid.header_click(1); // ascending by column B
        grid.set_filter("i"); // fig, kiwi
        assert_eq!(display_col(&grid, 1), vec!["fig", "kiwi"]);
        grid.clear_filter();
        assert_eq!(display_col(&grid, 1), vec!["banana", "fig", "kiwi", "pear"]);
    }

    #[test]
    fn highlight_rejected_out_of_range() {
        let mut grid = sample();
        grid.set_highlight(99, 0);
        assert_eq!(grid.highlight(), None);
        grid.set_highlight(1, 1);
        assert_eq!(grid.highlight(), Some(HighlightTarget { row: 1, col: 1 }));
    }

    #[test]
    fn highlight_cleared_when_view_shrinks() {
        let mut grid = sample();
        grid.set_highlight(3, 0);
        grid.set_filter("fig"); // one row left
        assert_eq!(grid.highlight(), None);
    }

    #[test]
    fn cells_never_mutated_by_sorting() {
        let mut grid = sample();
        grid.header_click(0);
        grid.header_click(0);
        // Data row 0 still holds its original normalized cell
        let data0 = &grid.cells[0][0];
        assert_eq!(data0.display, "10");
        assert!(matches!(data0.kind, CellKind::Number(_)));
    }

    #[test]
    fn header_click_past_last_column_is_ignored() {
        let mut grid = sample();
        grid.header_click(9);
        assert_eq!(grid.sort_state(), None);
    }
}
