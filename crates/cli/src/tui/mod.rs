//! Interactive viewer: grid rendering, sort cycling, cell search dispatch.
//!
//! All state changes happen synchronously in response to one key event; the
//! only effect that leaves the process is the browser launch, which is
//! dispatched and never awaited.

use std::io::{self, stdout, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};

use sheetseek_config::engines::EngineRegistry;
use sheetseek_config::settings::{Overflow, Settings};
use sheetseek_engine::grid::Grid;
use sheetseek_engine::query::{build_search_url, normalize_query, SearchEngine};
use sheetseek_engine::sort::SortDirection;
use sheetseek_engine::util::{display_width, pad_right, truncate_display};
use sheetseek_io::xlsx::WorkbookFile;

/// One workbook sheet, loaded and ready to show.
pub struct SheetTab {
    pub name: String,
    pub grid: Grid,
}

pub struct TuiOptions {
    pub sheets: Vec<SheetTab>,
    pub initial_sheet: usize,
    pub file_path: PathBuf,
    pub file_name: String,
    pub settings: Settings,
    pub engines: EngineRegistry,
}

/// Open a workbook and load every sheet, honoring the configured width cap.
pub fn load_workbook(path: &Path, settings: &Settings) -> Result<Vec<SheetTab>, String> {
    let cap = match settings.overflow {
        Overflow::Truncate => settings.max_column_width,
        Overflow::Scroll => usize::MAX,
    };
    let mut workbook = WorkbookFile::open(path)?;
    workbook
        .sheet_names()
        .to_vec()
        .iter()
        .map(|name| {
            Ok(SheetTab {
                name: name.clone(),
                grid: workbook.load_sheet(name, cap)?,
            })
        })
        .collect()
}

enum Overlay {
    Help,
    FullText(String),
}

struct TuiApp {
    sheets: Vec<SheetTab>,
    active_sheet: usize,
    cursor_row: usize,
    cursor_col: usize,
    scroll_row: usize,
    scroll_col: usize,
    file_path: PathBuf,
    file_name: String,
    settings: Settings,
    engines: EngineRegistry,
    status: Option<String>,
    overlay: Option<Overlay>,
    /// Some while the user is typing a filter (live-applied)
    filter_entry: Option<String>,
    should_quit: bool,
    /// Width of the row-number gutter, from the sheet's max file row
    row_num_width: usize,
    multi_sheet: bool,
}

impl TuiApp {
    fn new(options: TuiOptions) -> Self {
        let active = options
            .initial_sheet
            .min(options.sheets.len().saturating_sub(1));
        let row_num_width = Self::compute_row_num_width(&options.sheets[active].grid);
        let multi = options.sheets.len() > 1;
        Self {
            sheets: options.sheets,
            active_sheet: active,
            cursor_row: 0,
            cursor_col: 0,
            scroll_row: 0,
            scroll_col: 0,
            file_path: options.file_path,
            file_name: options.file_name,
            settings: options.settings,
            engines: options.engines,
            status: None,
            overlay: None,
            filter_entry: None,
            should_quit: false,
            row_num_width,
            multi_sheet: multi,
        }
    }

    fn compute_row_num_width(grid: &Grid) -> usize {
        let max_file_row = grid.total_rows();
        let digits = if max_file_row == 0 {
            1
        } else {
            (max_file_row as f64).log10().floor() as usize + 1
        };
        digits.max(3) + 1
    }

    fn grid(&self) -> &Grid {
        &self.sheets[self.active_sheet].grid
    }

    fn grid_mut(&mut self) -> &mut Grid {
        &mut self.sheets[self.active_sheet].grid
    }

    fn sheet_name(&self) -> &str {
        &self.sheets[self.active_sheet].name
    }

    // ---------------- Sheet switching ----------------

    fn switch_sheet(&mut self, idx: usize) {
        if idx >= self.sheets.len() || idx == self.active_sheet {
            return;
        }
        self.grid_mut().clear_highlight();
        self.active_sheet = idx;
        self.cursor_row = 0;
        self.cursor_col = 0;
        self.scroll_row = 0;
        self.scroll_col = 0;
        self.row_num_width = Self::compute_row_num_width(self.grid());
        self.sync_highlight();
    }

    fn next_sheet(&mut self) {
        if self.sheets.len() > 1 {
            let next = (self.active_sheet + 1) % self.sheets.len();
            self.switch_sheet(next);
        }
    }

    fn prev_sheet(&mut self) {
        if self.sheets.len() > 1 {
            let prev = if self.active_sheet == 0 {
                self.sheets.len() - 1
            } else {
                self.active_sheet - 1
            };
            self.switch_sheet(prev);
        }
    }

    // ---------------- Cursor / highlight ----------------

    fn clamp_cursor(&mut self) {
        let rows = self.grid().display_rows();
        let cols = self.grid().num_cols();
        self.cursor_row = self.cursor_row.min(rows.saturating_sub(1));
        self.cursor_col = self.cursor_col.min(cols.saturating_sub(1));
    }

    /// Keep the grid's highlight target in lockstep with the cursor.
    fn sync_highlight(&mut self) {
        let (row, col) = (self.cursor_row, self.cursor_col);
        self.grid_mut().set_highlight(row, col);
    }

    fn move_cursor(&mut self, drow: i32, dcol: i32) {
        let grid = self.grid();
        let (display_rows, num_cols) = (grid.display_rows(), grid.num_cols());
        if display_rows == 0 || num_cols == 0 {
            return;
        }
        self.cursor_row = (self.cursor_row as i32 + drow)
            .max(0)
            .min(display_rows as i32 - 1) as usize;
        self.cursor_col = (self.cursor_col as i32 + dcol)
            .max(0)
            .min(num_cols as i32 - 1) as usize;
        self.sync_highlight();
    }

    fn page_up(&mut self) {
        self.cursor_row = self.cursor_row.saturating_sub(20);
        self.sync_highlight();
    }

    fn page_down(&mut self) {
        let rows = self.grid().display_rows();
        if rows > 0 {
            self.cursor_row = (self.cursor_row + 20).min(rows - 1);
        }
        self.sync_highlight();
    }

    fn current_cell_text(&self) -> String {
        self.grid()
            .cell_at(self.cursor_row, self.cursor_col)
            .map(|c| c.display.clone())
            .unwrap_or_default()
    }

    // ---------------- Actions ----------------

    fn sort_current_column(&mut self) {
        let col = self.cursor_col;
        if self.grid().num_cols() == 0 {
            return;
        }
        self.grid_mut().header_click(col);
        let name = self.grid().col_name(col).to_string();
        self.status = Some(match self.grid().sort_state() {
            Some(s) if s.direction == SortDirection::Ascending => {
                format!("sorted by {} ascending", name)
            }
            Some(_) => format!("sorted by {} descending", name),
            None => "restored original order".to_string(),
        });
        self.clamp_cursor();
        self.sync_highlight();
    }

    fn default_engine(&self) -> &SearchEngine {
        self.engines.get_or_first(&self.settings.default_engine)
    }

    fn alt_engine(&self) -> &SearchEngine {
        self.engines.get_or_first(&self.settings.alt_engine)
    }

    /// Build the URL for the current cell and hand it to the OS opener.
    /// Fire-and-forget: the browser process is never observed.
    fn search_with(&mut self, alt: bool) {
        let engine = if alt {
            self.alt_engine().clone()
        } else {
            self.default_engine().clone()
        };
        let text = self.current_cell_text();
        self.status = Some(match build_search_url(&engine, &text) {
            Ok(url) => match open::that_detached(&url) {
                Ok(()) => format!("searching with {}", engine.name),
                Err(e) => format!("browser launch failed: {}", e),
            },
            Err(e) => e.to_string(),
        });
    }

    fn cycle_default_engine(&mut self) {
        let names: Vec<String> = self.engines.names().iter().map(|s| s.to_string()).collect();
        let current = names
            .iter()
            .position(|n| n == &self.settings.default_engine)
            .unwrap_or(0);
        let next = names[(current + 1) % names.len()].clone();
        self.settings.default_engine = next.clone();
        self.settings.save(&sheetseek_config::settings_path());
        self.status = Some(format!("default engine: {}", next));
    }

    fn copy_to_clipboard(&mut self, text: String, what: &str) {
        let result = arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text));
        self.status = Some(match result {
            Ok(()) => format!("{} copied", what),
            Err(e) => format!("clipboard error: {}", e),
        });
    }

    fn copy_cell(&mut self) {
        let text = self.current_cell_text();
        if text.is_empty() {
            return;
        }
        self.copy_to_clipboard(text, "cell text");
    }

    fn copy_search_url(&mut self) {
        let engine = self.default_engine().clone();
        match build_search_url(&engine, &self.current_cell_text()) {
            Ok(url) => self.copy_to_clipboard(url, "search URL"),
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    fn show_full_text(&mut self) {
        let text = self.current_cell_text();
        if !text.is_empty() {
            self.overlay = Some(Overlay::FullText(text));
        }
    }

    fn reload(&mut self) {
        match load_workbook(&self.file_path, &self.settings) {
            Ok(sheets) => {
                // Stay on the same-named sheet if it still exists
                let name = self.sheet_name().to_string();
                let active = sheets
                    .iter()
                    .position(|s| s.name == name)
                    .unwrap_or(0);
                self.sheets = sheets;
                self.active_sheet = active;
                self.multi_sheet = self.sheets.len() > 1;
                self.cursor_row = 0;
                self.cursor_col = 0;
                self.scroll_row = 0;
                self.scroll_col = 0;
                self.row_num_width = Self::compute_row_num_width(self.grid());
                self.sync_highlight();
                self.status = Some("reloaded".to_string());
            }
            // Previous grids stay untouched on a failed load
            Err(e) => self.status = Some(e),
        }
    }

    // ---------------- Filter entry ----------------

    fn apply_filter(&mut self, text: String) {
        self.grid_mut().set_filter(&text);
        self.clamp_cursor();
        self.sync_highlight();
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        let Some(mut entry) = self.filter_entry.take() else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.grid_mut().clear_filter();
                self.clamp_cursor();
                self.sync_highlight();
            }
            KeyCode::Enter => {
                self.filter_entry = None;
            }
            KeyCode::Backspace => {
                entry.pop();
                self.apply_filter(entry.clone());
                self.filter_entry = Some(entry);
            }
            KeyCode::Char(c) => {
                entry.push(c);
                self.apply_filter(entry.clone());
                self.filter_entry = Some(entry);
            }
            _ => {
                self.filter_entry = Some(entry);
            }
        }
    }

    // ---------------- Key dispatch ----------------

    fn handle_key(&mut self, key: KeyEvent) {
        if self.overlay.is_some() {
            // Any key dismisses an overlay
            self.overlay = None;
            return;
        }
        if self.filter_entry.is_some() {
            self.handle_filter_key(key);
            return;
        }

        self.status = None;
        match key.code {
            KeyCode::Esc => {
                if !self.grid().filter().is_empty() {
                    self.grid_mut().clear_filter();
                    self.clamp_cursor();
                    self.sync_highlight();
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Enter => self.search_with(false),
            KeyCode::Up => self.move_cursor(-1, 0),
            KeyCode::Down => self.move_cursor(1, 0),
            KeyCode::Left => self.move_cursor(0, -1),
            KeyCode::Right => self.move_cursor(0, 1),
            KeyCode::PageUp => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    self.prev_sheet();
                } else {
                    self.page_up();
                }
            }
            KeyCode::PageDown => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    self.next_sheet();
                } else {
                    self.page_down();
                }
            }
            KeyCode::Home => {
                self.cursor_row = 0;
                self.sync_highlight();
            }
            KeyCode::End => {
                let rows = self.grid().display_rows();
                if rows > 0 {
                    self.cursor_row = rows - 1;
                }
                self.sync_highlight();
            }
            KeyCode::F(2) => self.show_full_text(),
            KeyCode::Tab => {
                if self.multi_sheet {
                    self.next_sheet();
                } else {
                    self.move_cursor(0, 1);
                }
            }
            KeyCode::BackTab => {
                if self.multi_sheet {
                    self.prev_sheet();
                } else {
                    self.move_cursor(0, -1);
                }
            }
            KeyCode::Char(c) => self.handle_char(c),
            _ => {}
        }
    }

    fn handle_char(&mut self, c: char) {
        let keys = self.settings.keys.clone();
        match c {
            _ if c == keys.sort => self.sort_current_column(),
            _ if c == keys.search_alt => self.search_with(true),
            _ if c == keys.filter => {
                self.filter_entry = Some(self.grid().filter().to_string());
            }
            _ if c == keys.copy_cell => self.copy_cell(),
            _ if c == keys.copy_url => self.copy_search_url(),
            _ if c == keys.full_text => self.show_full_text(),
            _ if c == keys.reload => self.reload(),
            'q' => self.should_quit = true,
            '?' => self.overlay = Some(Overlay::Help),
            'e' => self.cycle_default_engine(),
            'k' => self.move_cursor(-1, 0),
            'j' => self.move_cursor(1, 0),
            'h' => self.move_cursor(0, -1),
            'l' => self.move_cursor(0, 1),
            'g' => {
                self.cursor_row = 0;
                self.sync_highlight();
            }
            'G' => {
                let rows = self.grid().display_rows();
                if rows > 0 {
                    self.cursor_row = rows - 1;
                }
                self.sync_highlight();
            }
            '0' => {
                self.cursor_col = 0;
                self.sync_highlight();
            }
            '$' => {
                let cols = self.grid().num_cols();
                if cols > 0 {
                    self.cursor_col = cols - 1;
                }
                self.sync_highlight();
            }
            c @ '1'..='9' if self.multi_sheet => {
                let idx = (c as usize) - ('1' as usize);
                self.switch_sheet(idx);
            }
            _ => {}
        }
    }

    // ---------------- Scrolling ----------------

    fn ensure_visible(&mut self, visible_rows: usize, area_width: u16) {
        if self.cursor_row < self.scroll_row {
            self.scroll_row = self.cursor_row;
        }
        if visible_rows > 0 && self.cursor_row >= self.scroll_row + visible_rows {
            self.scroll_row = self.cursor_row - visible_rows + 1;
        }

        let available = (area_width as usize).saturating_sub(self.row_num_width + 1);
        let vis_cols = self.visible_columns(self.scroll_col, available);

        if self.cursor_col < self.scroll_col {
            self.scroll_col = self.cursor_col;
        }
        if let Some(&last_vis) = vis_cols.last() {
            if self.cursor_col > last_vis {
                let mut sc = self.scroll_col;
                loop {
                    let cols = self.visible_columns(sc, available);
                    match cols.last() {
                        Some(&last) if last < self.cursor_col => {
                            sc += 1;
                            if sc >= self.grid().num_cols() {
                                break;
                            }
                        }
                        _ => break,
                    }
                }
                self.scroll_col = sc;
            }
        }
    }

    fn visible_columns(&self, start_col: usize, available: usize) -> Vec<usize> {
        let grid = self.grid();
        let mut cols = Vec::new();
        let mut used = 0usize;
        for c in start_col..grid.num_cols() {
            let w = grid.column_width(c) + 1;
            if used + w > available && !cols.is_empty() {
                break;
            }
            used += w;
            cols.push(c);
        }
        cols
    }

    // ---------------- Drawing ----------------

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        if self.multi_sheet {
            let chunks = Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);
            self.draw_title(frame, chunks[0]);
            self.draw_tab_bar(frame, chunks[1]);
            self.draw_grid(frame, chunks[2]);
            self.draw_status(frame, chunks[3]);
        } else {
            let chunks = Layout::vertical([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);
            self.draw_title(frame, chunks[0]);
            self.draw_grid(frame, chunks[1]);
            self.draw_status(frame, chunks[2]);
        }

        match &self.overlay {
            Some(Overlay::Help) => self.draw_help(frame, area),
            Some(Overlay::FullText(text)) => self.draw_full_text(frame, area, text),
            None => {}
        }
    }

    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let grid = self.grid();
        let row_info = if grid.display_rows() == grid.total_rows() {
            format!("{} rows x {} cols", grid.total_rows(), grid.num_cols())
        } else {
            format!(
                "{}/{} rows x {} cols (filtered)",
                grid.display_rows(),
                grid.total_rows(),
                grid.num_cols()
            )
        };
        let sheet_info = if self.multi_sheet {
            format!(" | {} sheets", self.sheets.len())
        } else {
            String::new()
        };
        let title = format!(
            " sheetseek: {} | {} | {}{} ",
            self.file_name,
            self.sheet_name(),
            row_info,
            sheet_info
        );
        let para = Paragraph::new(Line::from(vec![Span::styled(
            title,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]))
        .style(Style::default().bg(Color::Cyan));
        frame.render_widget(para, area);
    }

    fn draw_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        for (i, sheet) in self.sheets.iter().enumerate() {
            let label = if i < 9 {
                format!(" {}:{} ", i + 1, sheet.name)
            } else {
                format!(" {} ", sheet.name)
            };
            if i == self.active_sheet {
                spans.push(Span::styled(
                    label,
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ));
            } else {
                spans.push(Span::styled(
                    label,
                    Style::default().fg(Color::Gray).bg(Color::DarkGray),
                ));
            }
            spans.push(Span::styled(" ", Style::default().bg(Color::Black)));
        }
        let para = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
        frame.render_widget(para, area);
    }

    fn draw_grid(&self, frame: &mut Frame, area: Rect) {
        let grid = self.grid();
        if grid.display_rows() == 0 || grid.num_cols() == 0 {
            let msg = if grid.filter().is_empty() {
                "(empty sheet)"
            } else {
                "(no rows match the filter)"
            };
            let para = Paragraph::new(msg).style(Style::default().fg(Color::DarkGray));
            frame.render_widget(para, area);
            return;
        }

        let grid_available = (area.width as usize).saturating_sub(self.row_num_width + 1);
        let vis_cols = self.visible_columns(self.scroll_col, grid_available);
        let zebra_bg = if self.settings.zebra {
            parse_color(&self.settings.zebra_color).or(Some(Color::DarkGray))
        } else {
            None
        };
        let highlight_bg = parse_color(&self.settings.highlight_color).unwrap_or(Color::White);

        // Header line: column letters, sort arrow on the active column
        let gutter_blank = " ".repeat(self.row_num_width);
        let mut header_spans = vec![Span::styled(
            format!("{} ", gutter_blank),
            Style::default().fg(Color::DarkGray),
        )];
        let sort = grid.sort_state();
        for &c in &vis_cols {
            let w = grid.column_width(c);
            let mut name = grid.col_name(c).to_string();
            match sort {
                Some(s) if s.column == c => {
                    name.push(if s.direction == SortDirection::Ascending {
                        '▲'
                    } else {
                        '▼'
                    });
                }
                _ => {}
            }
            let style = if c == self.cursor_col {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            };
            header_spans.push(Span::styled(
                format!("{} ", pad_right(&name, w)),
                style,
            ));
        }

        let data_height = area.height.saturating_sub(1) as usize;
        let end_row = (self.scroll_row + data_height).min(grid.display_rows());

        let mut lines: Vec<Line> = Vec::with_capacity(data_height + 1);
        lines.push(Line::from(header_spans));

        for r in self.scroll_row..end_row {
            let is_cursor_row = r == self.cursor_row;
            let striped = zebra_bg.filter(|_| r % 2 == 1);
            let file_row = grid.file_row(r).unwrap_or(0);

            let row_num_style = if is_cursor_row {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let mut spans = vec![Span::styled(
                format!("{:>width$} ", file_row, width = self.row_num_width),
                row_num_style,
            )];

            for &c in &vis_cols {
                let w = grid.column_width(c);
                let value = grid
                    .cell_at(r, c)
                    .map(|cell| one_line(&cell.display))
                    .unwrap_or_default();

                let mut style = if is_cursor_row && c == self.cursor_col {
                    // The highlighted cell: border-less terminal equivalent
                    // of the original's cell frame
                    Style::default()
                        .fg(Color::Black)
                        .bg(highlight_bg)
                        .add_modifier(Modifier::BOLD)
                } else if is_cursor_row {
                    Style::default().fg(Color::White)
                } else {
                    Style::default().fg(Color::Gray)
                };
                if !(is_cursor_row && c == self.cursor_col) {
                    if let Some(bg) = striped {
                        style = style.bg(bg);
                    }
                }
                spans.push(Span::styled(format!("{} ", pad_right(&value, w)), style));
            }
            lines.push(Line::from(spans));
        }

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let grid = self.grid();

        let left = if let Some(entry) = &self.filter_entry {
            format!(" filter: {}▌", entry)
        } else {
            let preview = normalize_query(&self.current_cell_text());
            let col_name = grid.col_name(self.cursor_col);
            let file_row = grid.file_row(self.cursor_row).unwrap_or(0);
            let mut s = format!(
                " {}{}  {} chars  {}",
                col_name,
                file_row,
                preview.chars().count(),
                truncate_display(&preview, 60)
            );
            if !grid.filter().is_empty() {
                s.push_str(&format!("  [filter: {}]", grid.filter()));
            }
            if let Some(status) = &self.status {
                s.push_str(&format!("  | {}", status));
            }
            s
        };

        let right = format!(
            "engine: {}  Row {}/{}  ?: help ",
            self.default_engine().name,
            grid.file_row(self.cursor_row).unwrap_or(0),
            grid.total_rows(),
        );

        let padding =
            (area.width as usize).saturating_sub(display_width(&left) + display_width(&right));
        let status = format!("{}{:pad$}{}", left, "", right, pad = padding);

        let para = Paragraph::new(Line::from(vec![Span::styled(
            status,
            Style::default().fg(Color::Black).bg(Color::DarkGray),
        )]))
        .style(Style::default().bg(Color::DarkGray));
        frame.render_widget(para, area);
    }

    fn draw_full_text(&self, frame: &mut Frame, area: Rect, text: &str) {
        let popup = centered_popup(area, area.width.saturating_sub(8).min(76), 16);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" cell content (as stored) ")
            .style(Style::default().bg(Color::Black));
        let para = Paragraph::new(text.to_string())
            .wrap(Wrap { trim: false })
            .block(block);
        frame.render_widget(Clear, popup);
        frame.render_widget(para, popup);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let keys = &self.settings.keys;
        let mut help_lines = vec![
            String::new(),
            "  Navigation".to_string(),
            "  ----------".to_string(),
            "  arrows / hjkl     Move cursor".to_string(),
            "  PgUp / PgDn       Page up/down".to_string(),
            "  Home / g          First row".to_string(),
            "  End  / G          Last row".to_string(),
            "  0 / $             First/last column".to_string(),
            String::new(),
            "  Viewing".to_string(),
            "  -------".to_string(),
            format!("  {}                 Sort column (asc/desc/off)", keys.sort),
            format!("  {}                 Filter rows (Esc clears)", keys.filter),
            format!("  {} / F2            Show full cell text", keys.full_text),
            format!("  {}                 Reload file", keys.reload),
            String::new(),
            "  Search".to_string(),
            "  ------".to_string(),
            "  Enter             Search cell (default engine)".to_string(),
            format!("  {}                 Search cell (alt engine)", keys.search_alt),
            "  e                 Cycle default engine".to_string(),
            format!("  {} / {}             Copy cell text / search URL", keys.copy_cell, keys.copy_url),
        ];

        if self.multi_sheet {
            help_lines.extend([
                String::new(),
                "  Sheets".to_string(),
                "  ------".to_string(),
                "  Tab / Shift+Tab   Next/prev sheet".to_string(),
                "  1..9              Jump to sheet".to_string(),
            ]);
        }
        help_lines.extend([
            String::new(),
            "  q / Esc           Quit".to_string(),
            String::new(),
        ]);

        let popup = centered_popup(area, 50, help_lines.len() as u16 + 2);
        let lines: Vec<Line> = help_lines
            .iter()
            .map(|s| Line::from(Span::styled(s.clone(), Style::default().fg(Color::White))))
            .collect();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Keybindings ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .style(Style::default().bg(Color::Black));
        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

/// Collapse embedded line breaks and tabs so one cell stays one grid line.
fn one_line(s: &str) -> String {
    if s.contains(['\r', '\n', '\t']) {
        s.replace(['\r', '\n', '\t'], " ")
    } else {
        s.to_string()
    }
}

/// Named terminal colors plus #rrggbb hex; None for anything unknown.
fn parse_color(name: &str) -> Option<Color> {
    if let Some(hex) = name.strip_prefix('#') {
        if hex.len() == 6 {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            return Some(Color::Rgb(r, g, b));
        }
        return None;
    }
    match name.to_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "darkgray" | "darkgrey" => Some(Color::DarkGray),
        "white" => Some(Color::White),
        _ => None,
    }
}

/// Run the interactive viewer until the user quits.
pub fn run(options: TuiOptions) -> Result<(), String> {
    let mut app = TuiApp::new(options);
    app.sync_highlight();

    terminal::enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {}", e))?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| format!("failed to enter alternate screen: {}", e))?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("failed to create terminal: {}", e))?;

    loop {
        let term_size = terminal
            .size()
            .map(|s| Rect::new(0, 0, s.width, s.height))
            .unwrap_or_default();
        let chrome = if app.multi_sheet { 4u16 } else { 3u16 };
        let visible_rows = term_size.height.saturating_sub(chrome) as usize;
        app.ensure_visible(visible_rows, term_size.width);

        terminal
            .draw(|frame| app.draw(frame))
            .map_err(|e| format!("draw error: {}", e))?;

        if event::poll(Duration::from_millis(100)).map_err(|e| format!("event poll error: {}", e))?
        {
            if let Event::Key(key) = event::read().map_err(|e| format!("event read error: {}", e))?
            {
                app.handle_key(key);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Print the grid as a plain text table to stdout (no TUI, no raw mode).
pub fn print_plain(grid: &Grid, max_rows: usize) -> Result<(), String> {
    let out = io::stdout();
    let mut w = out.lock();
    let row_num_width = 6;
    let limit = if max_rows == 0 {
        grid.display_rows()
    } else {
        max_rows.min(grid.display_rows())
    };

    write!(w, "{:>width$} ", "", width = row_num_width).map_err(|e| e.to_string())?;
    for c in 0..grid.num_cols() {
        let cw = grid.column_width(c);
        write!(w, "{} ", pad_right(grid.col_name(c), cw)).map_err(|e| e.to_string())?;
    }
    writeln!(w).map_err(|e| e.to_string())?;

    write!(w, "{:->width$}-", "", width = row_num_width).map_err(|e| e.to_string())?;
    for c in 0..grid.num_cols() {
        write!(w, "{}-", "-".repeat(grid.column_width(c))).map_err(|e| e.to_string())?;
    }
    writeln!(w).map_err(|e| e.to_string())?;

    for r in 0..limit {
        let file_row = grid.file_row(r).unwrap_or(0);
        write!(w, "{:>width$} ", file_row, width = row_num_width).map_err(|e| e.to_string())?;
        for c in 0..grid.num_cols() {
            let value = grid
                .cell_at(r, c)
                .map(|cell| one_line(&cell.display))
                .unwrap_or_default();
            write!(w, "{} ", pad_right(&value, grid.column_width(c))).map_err(|e| e.to_string())?;
        }
        writeln!(w).map_err(|e| e.to_string())?;
    }

    if limit < grid.display_rows() {
        writeln!(w, "... ({} more rows)", grid.display_rows() - limit)
            .map_err(|e| e.to_string())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_collapses_breaks() {
        assert_eq!(one_line("a\r\nb\tc"), "a  b c");
        assert_eq!(one_line("plain"), "plain");
    }

    #[test]
    fn parse_named_and_hex_colors() {
        assert_eq!(parse_color("darkgray"), Some(Color::DarkGray));
        assert_eq!(parse_color("White"), Some(Color::White));
        assert_eq!(parse_color("#102030"), Some(Color::Rgb(0x10, 0x20, 0x30)));
        assert_eq!(parse_color("chartreuse"), None);
        assert_eq!(parse_color("#12"), None);
    }
}
