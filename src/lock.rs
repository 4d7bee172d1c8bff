use std::sync::{Mutex, MutexGuard};

/// Lock `lock`, taking the data back if a panicking holder poisoned it.
/// Capture callbacks must never wedge the engine thread.
pub(crate) fn lock_or_recover<'a, T>(lock: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        crate::log_debug(&format!("mutex poisoned in {context}; recovering"));
        tracing::warn!(context, "mutex poisoned; recovering");
        poisoned.into_inner()
    })
}
