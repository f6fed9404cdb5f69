// Entry point for the terminal Minesweeper
// Parses the command line, sets up logging and settings, then hands over to the UI

use clap::Parser;
use std::error::Error;
use std::process::ExitCode;
use tracing::{info, warn};

// Module declarations
mod tms_board; // Minefield model and reveal rules
mod tms_cli; // Command-line flags and board size resolution
mod tms_color; // Terminal color roles
mod tms_config; // Settings file and records
mod tms_game; // Game lifecycle, moves, timer and mood
mod tms_lang; // Localized strings
mod tms_log; // File logging
mod tms_timer; // Pausable play clock
mod tms_ui; // Terminal rendering and event handling

use tms_cli::{Cli, resolve_dimensions};
use tms_config::load_or_create_config;
use tms_lang::Lang;
use tms_ui::run as run_ui;

fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();
    let log_file = tms_log::init_logging(cli.verbose);
    info!(version = env!("CARGO_PKG_VERSION"), log = ?log_file, "starting");

    let mut cfg = load_or_create_config();
    // a command-line size applies to this session only
    let startup = resolve_dimensions(&cli, &cfg);
    for w in &startup.warnings {
        eprintln!("warning: {w}");
        warn!("{w}");
    }
    info!(columns = startup.columns, rows = startup.rows, from_cli = startup.from_cli, "board size");

    let mut lang = Lang::new(&cfg.language);
    let code = run_ui(&mut cfg, &mut lang, startup.columns, startup.rows)?;
    info!("exiting");
    Ok(code)
}
