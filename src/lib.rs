pub mod audio;
pub mod clock;
pub mod config;
pub mod date;
pub mod dwell;
pub mod events;
mod lock;
mod logging;
pub mod pitch;
pub mod runtime;
pub mod session;
pub mod telemetry;
pub mod terminal_restore;

pub use logging::{
    crash_log_path, init_logging, log_debug, log_debug_content, log_file_path, log_panic,
};
pub use session::{PitchSession, SessionState, TickReport};
