//! Opt-in debug file logging and the crash log.
//!
//! Nothing here ever writes to the terminal: the TUI owns stdout and the JSON
//! renderer owns it in event mode.

use crate::config::AppConfig;
use std::{
    env, fs,
    io::Write,
    panic,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, OnceLock,
    },
    time::{SystemTime, UNIX_EPOCH},
};

const LOG_MAX_BYTES: u64 = 2 * 1024 * 1024;
const CRASH_LOG_MAX_BYTES: u64 = 256 * 1024;
static LOG_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_CONTENT_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_STATE: OnceLock<Mutex<Option<RotatingLog>>> = OnceLock::new();

pub fn log_file_path() -> PathBuf {
    env::temp_dir().join("singdate.log")
}

/// Path to the crash log file (metadata only unless --log-content).
pub fn crash_log_path() -> PathBuf {
    env::temp_dir().join("singdate_crash.log")
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".1");
    PathBuf::from(name)
}

/// Append-only file that rolls over to a single `.1` backup once full.
struct RotatingLog {
    path: PathBuf,
    file: fs::File,
    max_bytes: u64,
    len: u64,
}

impl RotatingLog {
    fn open(path: PathBuf, max_bytes: u64) -> Option<Self> {
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .ok()?;
        let len = file.metadata().map(|m| m.len()).unwrap_or(0);
        Some(Self {
            path,
            file,
            max_bytes,
            len,
        })
    }

    fn roll_over(&mut self) {
        let _ = fs::rename(&self.path, backup_path(&self.path));
        if let Ok(file) = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
        {
            self.file = file;
            self.len = 0;
        }
    }

    fn append(&mut self, line: &str) {
        if self.len > 0 && self.len.saturating_add(line.len() as u64) > self.max_bytes {
            self.roll_over();
        }
        if self.file.write_all(line.as_bytes()).is_ok() {
            self.len = self.len.saturating_add(line.len() as u64);
        }
    }
}

fn log_state() -> &'static Mutex<Option<RotatingLog>> {
    LOG_STATE.get_or_init(|| Mutex::new(None))
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Configure logging from CLI flags and environment.
pub fn init_logging(config: &AppConfig) {
    let enabled = config.logging_enabled();
    configure(enabled, enabled && config.log_content, log_file_path());
}

fn configure(enabled: bool, content_enabled: bool, path: PathBuf) {
    LOG_ENABLED.store(enabled, Ordering::Relaxed);
    LOG_CONTENT_ENABLED.store(content_enabled, Ordering::Relaxed);
    let mut state = log_state()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *state = if enabled {
        RotatingLog::open(path, LOG_MAX_BYTES)
    } else {
        None
    };
}

/// Write a debug line to the temp log so the TUI stays clean.
pub fn log_debug(msg: &str) {
    if !LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let line = format!("[{}] {msg}\n", unix_seconds());
    let mut state = log_state()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(log) = state.as_mut() {
        log.append(&line);
    }
}

/// Write lines that carry pitch readings; only with --log-content.
pub fn log_debug_content(msg: &str) {
    if !LOG_CONTENT_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    log_debug(msg);
}

/// Record a panic in the crash log, omitting the payload unless content logging is on.
pub fn log_panic(info: &panic::PanicHookInfo<'_>) {
    if !LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let location = info
        .location()
        .map(|loc| format!("{}:{}", loc.file(), loc.line()))
        .unwrap_or_else(|| "unknown".to_string());
    let payload = if LOG_CONTENT_ENABLED.load(Ordering::Relaxed) {
        if let Some(text) = info.payload().downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = info.payload().downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string panic payload".to_string()
        }
    } else {
        "panic payload omitted (log-content disabled)".to_string()
    };
    let line = format!(
        "[{}] panic at {location}: {payload} (v{})\n",
        unix_seconds(),
        env!("CARGO_PKG_VERSION")
    );
    if let Some(mut crash_log) = RotatingLog::open(crash_log_path(), CRASH_LOG_MAX_BYTES) {
        crash_log.append(&line);
    }
}
