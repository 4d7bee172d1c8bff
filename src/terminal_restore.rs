//! Raw mode and the alternate screen for the live date picker, undone on
//! drop and from the panic hook.

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::{
    io::{self, Write},
    panic,
    sync::{
        atomic::{AtomicU8, Ordering},
        Once,
    },
    thread,
};

const RAW_MODE: u8 = 0b01;
const ALT_SCREEN: u8 = 0b10;

/// Terminal modes entered by this process and not yet left.
static ENTERED: AtomicU8 = AtomicU8::new(0);
static PANIC_HOOK: Once = Once::new();

/// Held by the terminal renderer for the length of a live session.
pub struct TerminalRestoreGuard {
    _private: (),
}

impl TerminalRestoreGuard {
    /// Switch to raw mode and the alternate screen with the cursor hidden.
    /// Leaves the terminal untouched if either step fails.
    pub fn enter(out: &mut impl Write) -> io::Result<Self> {
        install_terminal_panic_hook();
        enable_raw_mode()?;
        ENTERED.fetch_or(RAW_MODE, Ordering::SeqCst);
        if let Err(err) = execute!(out, EnterAlternateScreen, Hide) {
            restore_terminal();
            return Err(err);
        }
        ENTERED.fetch_or(ALT_SCREEN, Ordering::SeqCst);
        Ok(Self { _private: () })
    }

    pub fn restore(&self) {
        restore_terminal();
    }
}

impl Drop for TerminalRestoreGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Leave whatever modes are still entered. Safe to call repeatedly.
pub fn restore_terminal() {
    let entered = ENTERED.swap(0, Ordering::SeqCst);
    if entered == 0 {
        return;
    }
    if entered & RAW_MODE != 0 {
        let _ = disable_raw_mode();
    }
    let mut stdout = io::stdout();
    if entered & ALT_SCREEN != 0 {
        let _ = execute!(stdout, LeaveAlternateScreen, Show);
    }
    let _ = stdout.flush();
}

fn entered_modes() -> u8 {
    ENTERED.load(Ordering::SeqCst)
}

/// Put the screen back before anything prints the panic, then record it in
/// the crash log.
pub fn install_terminal_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let had_screen = entered_modes() & ALT_SCREEN != 0;
            restore_terminal();
            crate::log_panic(info);
            crate::log_debug(&format!(
                "panic on thread '{}' (alternate screen: {had_screen})",
                thread::current().name().unwrap_or("unnamed")
            ));
            previous(info);
        }));
    });
}
