//! Toolkit warnings with colored terminal output.
//!
//! Each distinct message is printed at most once per process (or until
//! [`clear_warnings`] is called). The HTML loader and the selector engine
//! report input they accept but do not fully understand through here.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// ANSI color codes for terminal output
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Messages already printed, keyed by `[component] message`.
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// When set, warnings are still recorded but never printed.
static QUIET: AtomicBool = AtomicBool::new(false);

/// Warn about unsupported input (prints once per unique message).
///
/// # Example
/// ```ignore
/// warn_once("CSS", "unsupported pseudo-class ':hover'");
/// ```
pub fn warn_once(component: &str, message: &str) {
    if record(component, message) && !QUIET.load(Ordering::Relaxed) {
        eprintln!("{YELLOW}[Pinpoint {component}] ⚠ {message}{RESET}");
    }
}

/// Remember a warning; `true` if it had not been seen before.
fn record(component: &str, message: &str) -> bool {
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(format!("[{component}] {message}"))
}

/// Clear all recorded warnings (call before loading a new document).
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

/// Silence (or re-enable) warning output.
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}
