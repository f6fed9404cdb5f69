// Command line: board dimensions, verbosity, help and version

use crate::tms_board::{BoardError, DEFAULT_COLUMNS, DEFAULT_ROWS, validate_dimensions};
use crate::tms_config::Config;
use clap::{ArgAction, Parser};
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "tmsweeper", version, about, disable_version_flag = true)]
pub struct Cli {
    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: (),

    /// Board size, e.g. 16x12 (separators: x * ,)
    #[arg(short = 'd', long = "dimensions", value_name = "COLSxROWS", num_args = 0..=1)]
    pub dimensions: Option<Option<String>>,

    /// Board size given without a switch
    #[arg(value_name = "COLSxROWS")]
    pub board: Option<String>,

    /// Write debug output to the log file
    #[arg(short = 'o', long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DimensionError {
    #[error("\"{0}\" is not of the form COLSxROWS")]
    Malformed(String),
    #[error(transparent)]
    OutOfRange(#[from] BoardError),
}

/// Parse "COLSxROWS"; accepts x, X, * or , between the numbers
pub fn parse_dimensions(text: &str) -> Result<(usize, usize), DimensionError> {
    let malformed = || DimensionError::Malformed(text.to_string());
    let (c, r) = text
        .trim()
        .split_once(['x', 'X', '*', ','])
        .ok_or_else(malformed)?;
    let columns = c.trim().parse::<usize>().map_err(|_| malformed())?;
    let rows = r.trim().parse::<usize>().map_err(|_| malformed())?;
    validate_dimensions(columns, rows)?;
    Ok((columns, rows))
}

/// Board size to start with and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Startup {
    pub columns: usize,
    pub rows: usize,
    pub from_cli: bool,
    pub warnings: Vec<String>,
}

/// Pick the starting board: command line, then saved settings, then default
/// The first size that parses wins; invalid ones are skipped with a warning
pub fn resolve_dimensions(cli: &Cli, cfg: &Config) -> Startup {
    let mut warnings = Vec::new();
    let mut chosen: Option<((usize, usize), &str)> = None;

    let flag = match &cli.dimensions {
        Some(Some(text)) => Some(text.as_str()),
        Some(None) => {
            warnings.push("-d requires a board size, e.g. 16x12".to_string());
            None
        }
        None => None,
    };

    for text in flag.into_iter().chain(cli.board.as_deref()) {
        match (chosen, parse_dimensions(text)) {
            (Some((_, used)), _) => {
                warnings.push(format!("ignoring extra board size \"{text}\", using \"{used}\""));
            }
            (None, Ok(size)) => chosen = Some((size, text)),
            (None, Err(e)) => warnings.push(format!("invalid board size: {e}")),
        }
    }

    if let Some(((columns, rows), _)) = chosen {
        return Startup { columns, rows, from_cli: true, warnings };
    }

    let (columns, rows) = if validate_dimensions(cfg.columns, cfg.rows).is_ok() {
        (cfg.columns, cfg.rows)
    } else {
        (DEFAULT_COLUMNS, DEFAULT_ROWS)
    };
    Startup { columns, rows, from_cli: false, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(columns: usize, rows: usize) -> Config {
        Config { columns, rows, ..Config::default() }
    }

    #[test]
    fn parses_all_separators() {
        assert_eq!(parse_dimensions("14x9"), Ok((14, 9)));
        assert_eq!(parse_dimensions("14X9"), Ok((14, 9)));
        assert_eq!(parse_dimensions("14*9"), Ok((14, 9)));
        assert_eq!(parse_dimensions(" 14 , 9 "), Ok((14, 9)));
    }

    #[test]
    fn rejects_malformed_and_out_of_range() {
        assert_eq!(
            parse_dimensions("14-9"),
            Err(DimensionError::Malformed("14-9".to_string()))
        );
        assert!(matches!(parse_dimensions("ax9"), Err(DimensionError::Malformed(_))));
        assert!(matches!(parse_dimensions("100x9"), Err(DimensionError::OutOfRange(_))));
    }

    #[test]
    fn flag_forms_are_accepted() {
        let cli = Cli::try_parse_from(["tmsweeper", "-d", "20x10"]).unwrap();
        assert_eq!(cli.dimensions, Some(Some("20x10".to_string())));
        let cli = Cli::try_parse_from(["tmsweeper", "--dimensions=20x10", "-o"]).unwrap();
        assert_eq!(cli.dimensions, Some(Some("20x10".to_string())));
        assert!(cli.verbose);
        let cli = Cli::try_parse_from(["tmsweeper", "12x8"]).unwrap();
        assert_eq!(cli.board.as_deref(), Some("12x8"));
    }

    #[test]
    fn help_and_version_short_circuit() {
        let err = Cli::try_parse_from(["tmsweeper", "-v"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        let err = Cli::try_parse_from(["tmsweeper", "-h"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn command_line_size_wins() {
        let cli = Cli::try_parse_from(["tmsweeper", "-d", "20x10"]).unwrap();
        let s = resolve_dimensions(&cli, &cfg(16, 16));
        assert_eq!((s.columns, s.rows, s.from_cli), (20, 10, true));
        assert!(s.warnings.is_empty());
    }

    #[test]
    fn flag_beats_positional_with_warning() {
        let cli = Cli::try_parse_from(["tmsweeper", "8x8", "-d", "20x10"]).unwrap();
        let s = resolve_dimensions(&cli, &cfg(16, 16));
        assert_eq!((s.columns, s.rows), (20, 10));
        assert_eq!(s.warnings.len(), 1);
    }

    #[test]
    fn invalid_size_falls_back_to_settings_then_default() {
        let cli = Cli::try_parse_from(["tmsweeper", "-d", "3x3"]).unwrap();
        let s = resolve_dimensions(&cli, &cfg(16, 16));
        assert_eq!((s.columns, s.rows, s.from_cli), (16, 16, false));
        assert_eq!(s.warnings.len(), 1);

        let s = resolve_dimensions(&cli, &cfg(1, 1));
        assert_eq!((s.columns, s.rows), (DEFAULT_COLUMNS, DEFAULT_ROWS));
    }

    #[test]
    fn invalid_flag_does_not_hide_positional() {
        let cli = Cli::try_parse_from(["tmsweeper", "-d", "foo", "16x12"]).unwrap();
        let s = resolve_dimensions(&cli, &cfg(9, 9));
        assert_eq!((s.columns, s.rows, s.from_cli), (16, 12, true));
        assert_eq!(s.warnings.len(), 1);
        assert!(s.warnings[0].starts_with("invalid board size"));
    }

    #[test]
    fn flag_without_value_warns_and_continues() {
        let cli = Cli::try_parse_from(["tmsweeper", "-d"]).unwrap();
        assert_eq!(cli.dimensions, Some(None));
        let s = resolve_dimensions(&cli, &cfg(16, 16));
        assert_eq!((s.columns, s.rows, s.from_cli), (16, 16, false));
        assert_eq!(s.warnings.len(), 1);
    }
}
