//! # LogWriter: trace every dispatched value
//!
//! A minimal callback that emits one `tracing` event per value.
//! Use it for tests or demos; install a subscriber (e.g. `tracing-subscriber`) to see it.
//!
//! ## Example output
//! ```text
//! INFO chainbus::log: value dispatched label="session_created" value=SessionInfo { id: "1", .. }
//! INFO chainbus::log: value dispatched label="infer_type_ts" value=InferTypeRequest { .. }
//! ```

use std::fmt;

use crate::callbacks::{Callback, Completion};

/// Value writer callback.
#[derive(Debug, Clone, Copy)]
pub struct LogWriter {
    label: &'static str,
}

impl LogWriter {
    /// Construct a new [`LogWriter`] tagging every event with `label`.
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }
}

impl Default for LogWriter {
    fn default() -> Self {
        Self::new("chainbus")
    }
}

impl<T: fmt::Debug> Callback<T> for LogWriter {
    fn on_value(&self, value: &T) -> Completion {
        tracing::info!(target: "chainbus::log", label = self.label, value = ?value, "value dispatched");
        Completion::ok()
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
