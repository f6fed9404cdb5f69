// Persistent settings and best-time records, stored as TOML
// in the per-user config directory

use crate::tms_board::{DEFAULT_COLUMNS, DEFAULT_ROWS, validate_dimensions};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{env, fs, io};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access settings file: {0}")]
    Io(#[from] io::Error),
    #[error("settings file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot encode settings: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("no location available for the settings file")]
    NoLocation,
}

/// Best time on one board size
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub millis: u64,
    pub date: String, // YYYY-MM-DD
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub columns: usize,
    pub rows: usize,
    pub use_question_marks: bool,
    pub show_indicator: bool,
    pub ascii_icons: bool,
    pub language: String,
    /// Keyed by "COLSxROWS"
    pub records: BTreeMap<String, Record>,
}

impl Default for Config {
    fn default() -> Self {
        // Follow the system language on first run
        let language = sys_locale::get_locale()
            .filter(|l| l.to_lowercase().starts_with("zh"))
            .map_or_else(|| "en".to_string(), |_| "zh".to_string());

        Config {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            use_question_marks: true,
            show_indicator: true,
            ascii_icons: false,
            language,
            records: BTreeMap::new(),
        }
    }
}

pub fn record_key(columns: usize, rows: usize) -> String {
    format!("{columns}x{rows}")
}

impl Config {
    /// Replace saved board dimensions that are no longer playable
    pub fn sanitize(&mut self) {
        if let Err(e) = validate_dimensions(self.columns, self.rows) {
            warn!(error = %e, "saved board size rejected, using default");
            self.columns = DEFAULT_COLUMNS;
            self.rows = DEFAULT_ROWS;
        }
    }

    pub fn get_record(&self, columns: usize, rows: usize) -> Option<&Record> {
        self.records.get(&record_key(columns, rows))
    }

    /// Store a time if it beats the current best; returns true on a new record
    pub fn set_record(&mut self, columns: usize, rows: usize, millis: u64) -> bool {
        if self.get_record(columns, rows).is_some_and(|r| r.millis <= millis) {
            return false;
        }
        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        self.records.insert(record_key(columns, rows), Record { millis, date });
        true
    }

    /// Records ordered by board area, smallest first
    pub fn records_by_size(&self) -> Vec<((usize, usize), &Record)> {
        let mut out: Vec<_> = self
            .records
            .iter()
            .filter_map(|(key, rec)| {
                let (c, r) = key.split_once('x')?;
                Some(((c.parse().ok()?, r.parse().ok()?), rec))
            })
            .collect();
        out.sort_by_key(|&((c, r), _)| (c * r, c));
        out
    }
}

/// Location of the settings file: <config dir>/<exe name>.toml,
/// or the current directory when the platform has no config dir
pub fn config_path() -> Option<PathBuf> {
    let name = env::current_exe()
        .ok()
        .and_then(|exe| exe.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    match ProjectDirs::from("com", "tmsweeper", &name) {
        Some(proj) => Some(proj.config_dir().join(format!("{name}.toml"))),
        None => env::current_dir().ok().map(|dir| dir.join(format!("{name}.toml"))),
    }
}

pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path)?;
    let mut cfg: Config = toml::from_str(&text)?;
    cfg.sanitize();
    Ok(cfg)
}

pub fn save_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    let text = toml::to_string(cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    Ok(())
}

/// Load settings, writing the defaults on first run
/// Unreadable files fall back to defaults and are left untouched
pub fn load_or_create_config() -> Config {
    let Some(path) = config_path() else {
        warn!("{}", ConfigError::NoLocation);
        return Config::default();
    };
    match load_from(&path) {
        Ok(cfg) => {
            debug!(path = %path.display(), "settings loaded");
            cfg
        }
        Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
            let cfg = Config::default();
            match save_to(&path, &cfg) {
                Ok(()) => info!(path = %path.display(), "default settings written"),
                Err(e) => warn!(path = %path.display(), error = %e, "cannot write default settings"),
            }
            cfg
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "settings ignored, using defaults");
            Config::default()
        }
    }
}

/// Save settings; failures are logged only
pub fn save_config(cfg: &Config) {
    let Some(path) = config_path() else {
        warn!("{}", ConfigError::NoLocation);
        return;
    };
    if let Err(e) = save_to(&path, cfg) {
        warn!(path = %path.display(), error = %e, "cannot save settings");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before epoch")
            .as_nanos();
        let dir = env::temp_dir().join(format!("tmsweeper_{tag}_{nanos}"));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn save_then_load_keeps_settings_and_records() {
        let dir = temp_dir("roundtrip");
        let path = dir.join("nested").join("tmsweeper.toml");
        let mut cfg = Config {
            columns: 16,
            rows: 12,
            ascii_icons: true,
            language: "zh".to_string(),
            ..Config::default()
        };
        cfg.set_record(16, 12, 42_500);
        save_to(&path, &cfg).unwrap();

        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.get_record(16, 12).map(|r| r.millis), Some(42_500));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_keys_take_defaults() {
        let dir = temp_dir("partial");
        let path = dir.join("tmsweeper.toml");
        fs::write(&path, "columns = 20\nrows = 10\n").unwrap();
        let cfg = load_from(&path).unwrap();
        assert_eq!((cfg.columns, cfg.rows), (20, 10));
        assert!(cfg.use_question_marks);
        assert!(cfg.records.is_empty());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn invalid_saved_size_falls_back_to_default() {
        let dir = temp_dir("badsize");
        let path = dir.join("tmsweeper.toml");
        fs::write(&path, "columns = 200\nrows = 2\n").unwrap();
        let cfg = load_from(&path).unwrap();
        assert_eq!((cfg.columns, cfg.rows), (DEFAULT_COLUMNS, DEFAULT_ROWS));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn broken_file_is_a_parse_error() {
        let dir = temp_dir("broken");
        let path = dir.join("tmsweeper.toml");
        fs::write(&path, "columns = [").unwrap();
        assert!(matches!(load_from(&path), Err(ConfigError::Parse(_))));
        assert!(matches!(
            load_from(&dir.join("absent.toml")),
            Err(ConfigError::Io(_))
        ));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn only_faster_times_replace_a_record() {
        let mut cfg = Config::default();
        assert!(cfg.set_record(9, 9, 30_000));
        assert!(!cfg.set_record(9, 9, 31_000));
        assert!(!cfg.set_record(9, 9, 30_000));
        assert!(cfg.set_record(9, 9, 12_345));
        assert_eq!(cfg.get_record(9, 9).map(|r| r.millis), Some(12_345));
        assert!(cfg.get_record(8, 8).is_none());
    }

    #[test]
    fn records_are_listed_by_board_area() {
        let mut cfg = Config::default();
        cfg.set_record(30, 16, 1);
        cfg.set_record(9, 9, 2);
        cfg.set_record(16, 16, 3);
        cfg.records.insert("junk".to_string(), Record { millis: 4, date: String::new() });
        let sizes: Vec<_> = cfg.records_by_size().into_iter().map(|(s, _)| s).collect();
        assert_eq!(sizes, vec![(9, 9), (16, 16), (30, 16)]);
    }
}
