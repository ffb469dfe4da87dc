//! Optional diagnostic hook for anomalies the engine absorbs.

use std::fmt;
use std::sync::Arc;

/// Receives one message per absorbed anomaly (missing source data, unknown
/// language requested, lookup before initialization, ...).
pub type DiagnosticHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Logs through `tracing` and, when enabled, forwards to the hook.
#[derive(Clone, Default)]
pub struct Diagnostics {
    /// Optional receiver.
    hook: Option<DiagnosticHook>,
    /// `isDebug` of the owning engine.
    enabled: bool,
}

impl Diagnostics {
    /// Forwards to `hook` only when `enabled`.
    #[must_use]
    pub fn new(hook: Option<DiagnosticHook>, enabled: bool) -> Self {
        Self { hook, enabled }
    }

    /// Failure that was absorbed.
    pub fn warn(&self, message: &str) {
        tracing::warn!("{message}");
        self.forward(message);
    }

    /// Expected gap, such as a missing key.
    pub fn debug(&self, message: &str) {
        tracing::debug!("{message}");
        self.forward(message);
    }

    /// Calls the hook when enabled.
    fn forward(&self, message: &str) {
        if self.enabled
            && let Some(hook) = &self.hook
        {
            hook(message);
        }
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("hook", &self.hook.as_ref().map(|_| "<hook>"))
            .field("enabled", &self.enabled)
            .finish()
    }
}
