//! Column width computation.
//!
//! Width is a function of cell *content*, not row order: sorting reorders
//! rows and therefore never changes the result. Widths are recomputed only
//! when the grid is (re)built.

use crate::cell::Cell;
use crate::util::display_width;

/// Narrowest a column may get, so headers stay visible.
pub const MIN_COL_WIDTH: usize = 3;

/// Default cap; one pathological cell must not eat the whole screen.
/// Overridable via config.
pub const DEFAULT_MAX_COL_WIDTH: usize = 40;

/// Per-column display width: the maximum display width over the header and
/// every cell in the column, clamped to `[MIN_COL_WIDTH, max_width]`.
pub fn compute_widths(col_names: &[String], cells: &[Vec<Cell>], max_width: usize) -> Vec<usize> {
    let cap = max_width.max(MIN_COL_WIDTH);
    (0..col_names.len())
        .map(|c| {
            let header_w = display_width(&col_names[c]);
            let max_cell = cells
                .iter()
                .map(|row| row.get(c).map(|cell| display_width(&cell.display)).unwrap_or(0))
                .max()
                .unwrap_or(0);
            header_w.max(max_cell).clamp(MIN_COL_WIDTH, cap)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::RawPayload;

    fn rows(values: &[&[&str]]) -> Vec<Vec<Cell>> {
        values
            .iter()
            .map(|row| {
                row.iter()
                    .map(|s| Cell::normalize(RawPayload::Text(s.to_string())))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn widest_cell_wins() {
        let names = vec!["A".to_string(), "B".to_string()];
        let cells = rows(&[&["x", "yyyy"], &["xxxxxx", "y"]]);
        assert_eq!(compute_widths(&names, &cells, 40), vec![6, 4]);
    }

    #[test]
    fn header_included_in_scan() {
        let names = vec!["LongHeader".to_string()];
        let cells = rows(&[&["x"]]);
        assert_eq!(compute_widths(&names, &cells, 40), vec![10]);
    }

    #[test]
    fn clamped_to_cap_and_floor() {
        let names = vec!["A".to_string(), "B".to_string()];
        let long = "x".repeat(100);
        let cells = vec![vec![
            Cell::normalize(RawPayload::Text(long)),
            Cell::normalize(RawPayload::Text("y".to_string())),
        ]];
        assert_eq!(compute_widths(&names, &cells, 40), vec![40, MIN_COL_WIDTH]);
    }

    #[test]
    fn cjk_measured_in_display_columns() {
        let names = vec!["A".to_string()];
        let cells = rows(&[&["世界"]]);
        assert_eq!(compute_widths(&names, &cells, 40), vec![4]);
    }

    #[test]
    fn empty_grid_uses_floor() {
        let names = vec!["A".to_string()];
        let cells: Vec<Vec<Cell>> = Vec::new();
        assert_eq!(compute_widths(&names, &cells, 40), vec![MIN_COL_WIDTH]);
    }
}
