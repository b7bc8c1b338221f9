//! Logging bootstrap for the timeline core.
//!
//! # Responsibility
//! - Initialize file-based rolling logs exactly once per process.
//! - Keep diagnostic events metadata-only and single-line.
//!
//! # Invariants
//! - Initialization is idempotent for the same directory and level.
//! - Conflicting re-initialization is rejected, never silently applied.
//! - Initialization must not panic.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "storyline";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    level: String,
    log_dir: PathBuf,
    _logger: LoggerHandle,
}

/// Default log level for the current build mode: `debug` for debug
/// builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Initializes rotating file logging under `log_dir`.
///
/// # Contract
/// - Repeated calls with the same `level` and `log_dir` are no-ops.
/// - Calls that conflict with the active configuration return an error.
/// - `level` must be one of trace|debug|info|warn|error; `log_dir` must be
///   an absolute path.
///
/// # Errors
/// Returns a human-readable message when validation or logger backend
/// setup fails.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let level = validate_level(level)?;
    let log_dir = validate_log_dir(log_dir)?;

    if let Some(active) = LOGGING_STATE.get() {
        return check_active_matches(active, &level, &log_dir);
    }

    let state = LOGGING_STATE.get_or_try_init(|| start_logger(level.clone(), log_dir.clone()))?;

    // A racing init may have won with a different configuration.
    check_active_matches(state, &level, &log_dir)
}

fn start_logger(level: String, log_dir: PathBuf) -> Result<LoggingState, String> {
    std::fs::create_dir_all(&log_dir)
        .map_err(|err| format!("failed to create log directory `{}`: {err}", log_dir.display()))?;

    let logger = Logger::try_with_str(&level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
        .log_to_file(
            FileSpec::default()
                .directory(&log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    install_panic_hook();

    info!(
        "event=logging_init module=core status=ok level={} log_dir={} version={}",
        level,
        log_dir.display(),
        env!("CARGO_PKG_VERSION")
    );

    Ok(LoggingState {
        level,
        log_dir,
        _logger: logger,
    })
}

fn check_active_matches(active: &LoggingState, level: &str, log_dir: &Path) -> Result<(), String> {
    if active.log_dir != log_dir {
        return Err(format!(
            "logging already initialized at `{}`; refusing to switch to `{}`",
            active.log_dir.display(),
            log_dir.display()
        ));
    }
    if active.level != level {
        return Err(format!(
            "logging already initialized with level `{}`; refusing to switch to `{}`",
            active.level, level
        ));
    }
    Ok(())
}

fn validate_level(level: &str) -> Result<String, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        normalized @ ("trace" | "debug" | "info" | "warn" | "error") => {
            Ok(normalized.to_string())
        }
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn validate_log_dir(log_dir: &str) -> Result<PathBuf, String> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(format!("log_dir must be an absolute path, got `{trimmed}`"));
    }
    Ok(path.to_path_buf())
}

fn install_panic_hook() {
    const MAX_PAYLOAD_CHARS: usize = 120;

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        // Payloads can carry user text; strip newlines and cap length.
        let mut summary: String = payload
            .replace(['\n', '\r'], " ")
            .chars()
            .take(MAX_PAYLOAD_CHARS)
            .collect();
        if payload.chars().count() > MAX_PAYLOAD_CHARS {
            summary.push_str("...");
        }
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location, summary
        );
        previous_hook(panic_info);
    }));
}
