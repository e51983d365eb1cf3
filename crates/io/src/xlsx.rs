//! Excel workbook reading (xlsx, xlsm) on top of calamine.
//!
//! Calamine cell data is mapped to `RawPayload` at this boundary and
//! normalized immediately; nothing downstream ever touches parser types.
//! Cells calamine reports as errors degrade to per-cell markers rather
//! than failing the sheet.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader, Sheets};

use sheetseek_engine::cell::{Cell, RawPayload};
use sheetseek_engine::grid::Grid;
use sheetseek_engine::util::col_to_letter;

/// Maximum dimensions for a loaded sheet. Anything beyond is truncated,
/// not an error.
const MAX_ROWS: usize = 65536;
const MAX_COLS: usize = 256;

/// An open workbook: sheet names up front, sheets loaded on demand.
pub struct WorkbookFile {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
    sheet_names: Vec<String>,
}

impl std::fmt::Debug for WorkbookFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkbookFile")
            .field("path", &self.path)
            .field("sheet_names", &self.sheet_names)
            .finish_non_exhaustive()
    }
}

impl WorkbookFile {
    /// Open a workbook for reading. A failure here is surfaced to the
    /// caller, which keeps whatever grid it was already showing.
    pub fn open(path: &Path) -> Result<Self, String> {
        let sheets: Sheets<_> = open_workbook_auto(path)
            .map_err(|e| format!("failed to open {}: {}", path.display(), e))?;
        let sheet_names: Vec<String> = sheets.sheet_names().to_vec();
        if sheet_names.is_empty() {
            return Err(format!("{}: workbook contains no sheets", path.display()));
        }
        Ok(WorkbookFile {
            path: path.to_path_buf(),
            sheets,
            sheet_names,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Load one sheet into a grid of normalized cells.
    pub fn load_sheet(&mut self, name: &str, max_col_width: usize) -> Result<Grid, String> {
        let range = self
            .sheets
            .worksheet_range(name)
            .map_err(|e| format!("failed to read sheet '{}': {}", name, e))?;

        let (height, width) = range.get_size();
        if height == 0 || width == 0 {
            return Ok(build_grid(Vec::new(), max_col_width));
        }

        // Calamine ranges start at the first used cell; pad the offset back
        // in so gutter numbers match real file rows
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let start_row = (start_row as usize).min(MAX_ROWS);
        let start_col = (start_col as usize).min(MAX_COLS);

        let mut rows: Vec<Vec<RawPayload>> = Vec::with_capacity(height.min(MAX_ROWS));
        for _ in 0..start_row {
            rows.push(Vec::new());
        }

        for row in range.rows() {
            if rows.len() >= MAX_ROWS {
                break;
            }
            let mut payloads: Vec<RawPayload> = Vec::with_capacity(start_col + row.len());
            payloads.resize(start_col, RawPayload::Empty);
            for cell in row {
                if payloads.len() >= MAX_COLS {
                    break;
                }
                payloads.push(payload_from(cell));
            }
            rows.push(payloads);
        }

        Ok(build_grid(rows, max_col_width))
    }
}

fn payload_from(data: &Data) -> RawPayload {
    match data {
        Data::Empty => RawPayload::Empty,
        Data::String(s) => RawPayload::Text(s.clone()),
        Data::Float(n) => RawPayload::Number(*n),
        Data::Int(n) => RawPayload::Int(*n),
        Data::Bool(b) => RawPayload::Bool(*b),
        // Serial number exactly as stored; display must not reformat it
        Data::DateTime(dt) => RawPayload::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) => RawPayload::DateTimeText(s.clone()),
        Data::DurationIso(s) => RawPayload::DateTimeText(s.clone()),
        Data::Error(e) => RawPayload::Error(format!("{}", e)),
    }
}

/// Normalize payload rows into a rectangular grid: trailing all-empty
/// columns are dropped, short rows padded, column names generated.
pub fn build_grid(rows: Vec<Vec<RawPayload>>, max_col_width: usize) -> Grid {
    let mut num_cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);

    // Trim trailing columns that hold nothing anywhere
    while num_cols > 0 {
        let all_empty = rows
            .iter()
            .all(|r| matches!(r.get(num_cols - 1), None | Some(RawPayload::Empty)));
        if !all_empty {
            break;
        }
        num_cols -= 1;
    }

    let cells: Vec<Vec<Cell>> = rows
        .into_iter()
        .map(|mut row| {
            row.truncate(num_cols);
            row.resize(num_cols, RawPayload::Empty);
            row.into_iter().map(Cell::normalize).collect()
        })
        .collect();

    let col_names: Vec<String> = (0..num_cols).map(col_to_letter).collect();
    Grid::new(col_names, cells, max_col_width)
}
