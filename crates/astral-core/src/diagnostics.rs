#![forbid(unsafe_code)]

//! Debug-gated diagnostic output.
//!
//! Every Astral component owns a [`DebugLog`]. When the component's debug flag
//! is on, messages go to `tracing` at `DEBUG` level under the `astral` target,
//! formatted as `"<Component> $: <message>"`. When it is off, the message
//! closure is never evaluated.

use std::cell::Cell;

/// Tracing target shared by every component's debug output.
pub const LOG_TARGET: &str = "astral";

/// Per-component debug switch plus line-oriented sink.
#[derive(Debug)]
pub struct DebugLog {
    component: &'static str,
    enabled: Cell<bool>,
}

impl DebugLog {
    /// Create a disabled log for `component` (e.g. `"Astral.event"`).
    #[must_use]
    pub const fn new(component: &'static str) -> Self {
        Self {
            component,
            enabled: Cell::new(false),
        }
    }

    /// Component name used as the line prefix.
    #[must_use]
    pub const fn component(&self) -> &'static str {
        self.component
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Toggle debug output. The new state is itself logged when enabling.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
        self.log(|| format!("Debug mode set to: {enabled}"));
    }

    /// Emit `message()` if debug output is on.
    pub fn log(&self, message: impl FnOnce() -> String) {
        if !self.enabled.get() {
            return;
        }
        let message = message();
        tracing::debug!(
            target: LOG_TARGET,
            component = self.component,
            "{} $: {}",
            self.component,
            message
        );
    }
}
