//! One-time process initialization guard
//!
//! Desktop shells re-create their root view freely; side-effecting setup
//! (tray icon, file logging, panic hooks) must still run at most once per
//! process. The guard is an explicit initialization-state object with an
//! idempotent entry point, independent of any view's render cycle.

use std::sync::Once;

/// Process-wide initialization state.
///
/// Usually held in a `static`:
///
/// ```
/// use snapdock_core::startup::Startup;
///
/// static STARTUP: Startup = Startup::new();
///
/// STARTUP.ensure_started(|| {
///     // tray / logging setup
/// });
/// ```
#[derive(Debug)]
pub struct Startup {
    once: Once,
}

impl Startup {
    pub const fn new() -> Self {
        Self { once: Once::new() }
    }

    /// Runs `init` the first time this is called; every later call is a
    /// no-op, no matter which view triggers it.
    pub fn ensure_started<F: FnOnce()>(&self, init: F) {
        self.once.call_once(init);
    }

    pub fn is_started(&self) -> bool {
        self.once.is_completed()
    }
}

impl Default for Startup {
    fn default() -> Self {
        Self::new()
    }
}
