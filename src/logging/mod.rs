//! ## Sets up logging by reading configuration from environment variables.
//!
//! Environment variables used:
//! - LOG_MODE: "stdout" (default) or "file"
//! - LOG_LEVEL: log level ("trace", "debug", "info", "warn", "error"); default is "info"
//! - LOG_DATA_DIR: when using file mode, the directory of the log files (default "./logs")
//! - LOG_MAX_SIZE: size in bytes after which a log file rolls over (default 1GB)
//!
//! File mode writes `orchestrator-YYYY-MM-DD.N.log`, starting a new file each
//! day and whenever the current one exceeds `LOG_MAX_SIZE`.

use chrono::Utc;
use log::info;
use simplelog::{Config, LevelFilter, SimpleLogger, WriteLogger};
use std::{
    env,
    fs::{create_dir_all, metadata, OpenOptions},
    path::Path,
};

pub const LOG_FILE_NAME: &str = "orchestrator.log";
const DEFAULT_LOG_DIR: &str = "./logs";
const DEFAULT_LOG_MAX_SIZE: u64 = 1_073_741_824;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Stdout,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub mode: LogMode,
    pub level: LevelFilter,
    pub data_dir: String,
    pub max_size: u64,
}

/// Parses a level name, falling back to `Info` for anything unknown.
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

impl LogSettings {
    /// Reads the settings from the environment.
    ///
    /// # Panics
    /// Panics if `LOG_MAX_SIZE` is set but is not a valid u64.
    pub fn from_env() -> Self {
        let mode = match env::var("LOG_MODE") {
            Ok(mode) if mode.eq_ignore_ascii_case("file") => LogMode::File,
            _ => LogMode::Stdout,
        };
        let level = env::var("LOG_LEVEL")
            .map(|level| parse_level(&level))
            .unwrap_or(LevelFilter::Info);
        let data_dir = env::var("LOG_DATA_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string());
        let max_size = env::var("LOG_MAX_SIZE")
            .map(|s| {
                s.parse::<u64>()
                    .expect("LOG_MAX_SIZE must be a valid u64 if set")
            })
            .unwrap_or(DEFAULT_LOG_MAX_SIZE);

        Self {
            mode,
            level,
            data_dir,
            max_size,
        }
    }

    pub fn base_file_path(&self) -> String {
        format!("{}/{}", self.data_dir.trim_end_matches('/'), LOG_FILE_NAME)
    }

    /// Log file to write to on the given date, after size-based rolling.
    pub fn log_file_path(&self, date_str: &str) -> String {
        let base_file_path = self.base_file_path();
        let time_based_path = time_based_rolling(&base_file_path, date_str, 1);
        space_based_rolling(&time_based_path, &base_file_path, date_str, self.max_size)
    }
}

/// Computes the path of the rolled log file given the base file path and the date string.
pub fn compute_rolled_file_path(base_file_path: &str, date_str: &str, index: u32) -> String {
    let stem = base_file_path
        .strip_suffix(".log")
        .unwrap_or(base_file_path);
    format!("{}-{}.{}.log", stem, date_str, index)
}

/// Generates a time-based log file name.
pub fn time_based_rolling(base_file_path: &str, date_str: &str, index: u32) -> String {
    compute_rolled_file_path(base_file_path, date_str, index)
}

/// Returns `file_path`, or the first rolled sibling not yet over `max_size` bytes.
pub fn space_based_rolling(
    file_path: &str,
    base_file_path: &str,
    date_str: &str,
    max_size: u64,
) -> String {
    let mut final_path = file_path.to_string();
    let mut index = 1;
    while let Ok(metadata) = metadata(&final_path) {
        if metadata.len() <= max_size {
            break;
        }
        index += 1;
        final_path = compute_rolled_file_path(base_file_path, date_str, index);
    }
    final_path
}

/// Sets up logging by reading configuration from environment variables.
///
/// # Panics
/// Panics if the log file cannot be opened or a logger is already installed.
pub fn setup_logging() {
    let settings = LogSettings::from_env();

    match settings.mode {
        LogMode::File => {
            let date_str = Utc::now().format("%Y-%m-%d").to_string();
            let final_path = settings.log_file_path(&date_str);

            if let Some(parent) = Path::new(&final_path).parent() {
                create_dir_all(parent).expect("Failed to create log directory");
            }
            let log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&final_path)
                .unwrap_or_else(|e| panic!("Unable to open log file {}: {}", final_path, e));

            WriteLogger::init(settings.level, Config::default(), log_file)
                .expect("Failed to initialize file logger");
            info!("Logging to file {}", final_path);
        }
        LogMode::Stdout => {
            SimpleLogger::init(settings.level, Config::default())
                .expect("Failed to initialize simple logger");
        }
    }

    info!(
        "Logging is successfully configured (mode: {:?}, level: {})",
        settings.mode, settings.level
    );
}
