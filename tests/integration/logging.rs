//! Integration tests for file logging.
//!
//! The logger is global, so it is installed once per test binary and the
//! environment is guarded by a mutex.
//!   Refer to `src/logging/mod.rs` for more details.
use chrono::Utc;
use log::info;
use std::{env, fs, path::Path, sync::Mutex, thread, time::Duration};
use tempfile::TempDir;
use tx_orchestrator::logging::{
    setup_logging, space_based_rolling, time_based_rolling, LogSettings, LOG_FILE_NAME,
};

use lazy_static::lazy_static;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

lazy_static! {
    static ref LOG_DIR: TempDir = TempDir::new().expect("Failed to create temp dir");
    static ref INIT_LOGGING: () = {
        env::set_var("LOG_MODE", "file");
        env::set_var("LOG_LEVEL", "debug");
        env::set_var("LOG_DATA_DIR", LOG_DIR.path());
        env::remove_var("LOG_MAX_SIZE");
        setup_logging();
    };
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

#[test]
fn test_setup_logging_file_mode_writes_dated_file() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());

    *INIT_LOGGING;
    info!("orchestrator integration test line");
    log::logger().flush();
    thread::sleep(Duration::from_millis(200));

    let base = LOG_DIR.path().join(LOG_FILE_NAME);
    let expected = time_based_rolling(base.to_str().unwrap(), &today(), 1);
    assert!(
        Path::new(&expected).exists(),
        "Expected log file {} does not exist",
        expected
    );
    let content = fs::read_to_string(&expected).unwrap();
    assert!(content.contains("orchestrator integration test line"));
}

#[test]
fn test_log_file_path_rolls_past_full_files() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());

    let temp_dir = TempDir::new().unwrap();
    let settings = LogSettings {
        data_dir: temp_dir.path().to_str().unwrap().to_string(),
        max_size: 10,
        ..LogSettings::from_env()
    };
    let date_str = today();

    let first = settings.log_file_path(&date_str);
    assert!(first.ends_with(&format!("orchestrator-{}.1.log", date_str)));

    fs::write(&first, "more than ten bytes").unwrap();
    let rolled = settings.log_file_path(&date_str);
    assert!(rolled.ends_with(&format!("orchestrator-{}.2.log", date_str)));
}

#[test]
fn test_space_based_rolling_returns_original_when_under_max_size() {
    let temp_dir = TempDir::new().unwrap();
    let base_file_path = temp_dir.path().join(LOG_FILE_NAME);
    let base_file_path = base_file_path.to_str().unwrap();
    let date_str = today();
    let time_based_path = time_based_rolling(base_file_path, &date_str, 1);

    fs::write(&time_based_path, "small file").unwrap();

    assert_eq!(
        space_based_rolling(&time_based_path, base_file_path, &date_str, 10_000),
        time_based_path
    );
}
