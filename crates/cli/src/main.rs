// sheetseek - read-only terminal viewer for Excel workbooks.
// Opens xlsx/xlsm, shows every cell as its literal stored text, sorts
// columns, and searches the web from the selected cell.

mod tui;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use sheetseek_config::engines::EngineRegistry;
use sheetseek_config::settings::Settings;

#[derive(Parser)]
#[command(name = "sheetseek")]
#[command(about = "Read-only xlsx/xlsm viewer with cell web search")]
#[command(version)]
#[command(after_help = "\
Examples:
  sheetseek report.xlsx
  sheetseek report.xlsx --sheet Totals
  sheetseek report.xlsx --plain | head -20")]
struct Cli {
    /// Excel file to open (.xlsx, .xlsm)
    file: PathBuf,

    /// Sheet to show first (default: first sheet in the workbook)
    #[arg(long)]
    sheet: Option<String>,

    /// Print the sheet as a plain table to stdout instead of the TUI
    #[arg(long)]
    plain: bool,

    /// Row cap for --plain output (0 = all rows)
    #[arg(long, default_value_t = 0)]
    max_rows: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = Settings::load_or_create(&sheetseek_config::settings_path());
    let engines = EngineRegistry::load_or_create(&sheetseek_config::engines_path());

    match run(cli, settings, engines) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("sheetseek: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, settings: Settings, engines: EngineRegistry) -> Result<(), String> {
    let sheets = tui::load_workbook(&cli.file, &settings)?;

    let initial = match &cli.sheet {
        Some(wanted) => sheets
            .iter()
            .position(|s| &s.name == wanted)
            .ok_or_else(|| format!("no sheet named '{}' in {}", wanted, cli.file.display()))?,
        None => 0,
    };

    if cli.plain {
        return tui::print_plain(&sheets[initial].grid, cli.max_rows);
    }

    let file_name = cli
        .file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| cli.file.display().to_string());

    tui::run(tui::TuiOptions {
        sheets,
        initial_sheet: initial,
        file_path: cli.file.clone(),
        file_name,
        settings,
        engines,
    })
}
