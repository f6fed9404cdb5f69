// File logging; the terminal itself belongs to the UI

use directories::ProjectDirs;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub fn log_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("com", "tmsweeper", env!("CARGO_PKG_NAME"))?;
    Some(proj.data_local_dir().join("tmsweeper.log"))
}

fn open_log(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Install the global subscriber
/// RUST_LOG overrides the level; otherwise info, or debug when verbose
/// Returns the log file in use, if one could be opened
pub fn init_logging(verbose: bool) -> Option<PathBuf> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false);

    let path = log_path();
    match path.as_deref().and_then(open_log) {
        Some(file) => {
            builder.with_writer(Mutex::new(file)).init();
            path
        }
        None => {
            builder.with_writer(std::io::sink).init();
            None
        }
    }
}
