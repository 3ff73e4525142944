//! Error types used by channels, cursors and registry callbacks.
//!
//! This module defines three enums:
//!
//! - [`CallbackError`]: failures raised by (or caught around) a registry callback.
//! - [`TryNextError`]: outcome of a non-blocking [`Cursor::try_next`](crate::Cursor::try_next).
//! - [`ShutdownError`]: a registry shutdown that did not finish within its grace period.
//!
//! The channel itself never fails; emitting into a closed channel silently drops the value.
//! All types provide `as_label` for logs/metrics, mirroring each other.

use std::any::Any;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// # Errors produced by registry callbacks.
///
/// A callback reports [`CallbackError::Failed`] itself (by returning it);
/// [`CallbackError::Panicked`] is produced by the registry when it catches a panic
/// raised inside a callback or inside the future it returned.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallbackError {
    /// Callback reported a failure for this value.
    #[error("callback failed: {reason}")]
    Failed {
        /// The underlying error message.
        reason: String,
    },

    /// Callback panicked; the panic was caught and the dispatch continued.
    #[error("callback panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl CallbackError {
    /// Builds a [`CallbackError::Failed`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use chainbus::CallbackError;
    ///
    /// let err = CallbackError::failed("disk full");
    /// assert_eq!(err.to_string(), "callback failed: disk full");
    /// ```
    pub fn failed(reason: impl fmt::Display) -> Self {
        CallbackError::Failed {
            reason: reason.to_string(),
        }
    }

    /// Builds a [`CallbackError::Panicked`] from a caught panic payload.
    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let info = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        CallbackError::Panicked { info }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use chainbus::CallbackError;
    ///
    /// assert_eq!(CallbackError::failed("boom").as_label(), "callback_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            CallbackError::Failed { .. } => "callback_failed",
            CallbackError::Panicked { .. } => "callback_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            CallbackError::Failed { reason } => format!("error: {reason}"),
            CallbackError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// True if the error was produced by a caught panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, CallbackError::Panicked { .. })
    }
}

/// # Outcome of a non-blocking cursor advance.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryNextError {
    /// The cursor is caught up; nothing has been emitted past its position yet.
    #[error("no value emitted past the cursor position")]
    Empty,

    /// The channel was closed and every value before the close has been consumed.
    #[error("channel closed")]
    Closed,
}

impl TryNextError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TryNextError::Empty => "cursor_empty",
            TryNextError::Closed => "cursor_closed",
        }
    }
}

/// # Errors produced by registry shutdown.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShutdownError {
    /// Spawned callback futures were still running when the grace period ran out;
    /// they were aborted.
    #[error("registry {registry}: shutdown grace {grace:?} exceeded; aborted {stuck} callback future(s)")]
    GraceExceeded {
        /// Name of the registry being shut down.
        registry: &'static str,
        /// The configured grace duration.
        grace: Duration,
        /// Number of callback futures that had to be aborted.
        stuck: usize,
    },
}

impl ShutdownError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use chainbus::ShutdownError;
    ///
    /// let err = ShutdownError::GraceExceeded { registry: "r", grace: Duration::from_secs(1), stuck: 2 };
    /// assert_eq!(err.as_label(), "shutdown_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ShutdownError::GraceExceeded { .. } => "shutdown_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ShutdownError::GraceExceeded {
                registry,
                grace,
                stuck,
            } => format!("grace exceeded after {grace:?}; registry={registry} stuck={stuck}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_payload_str() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        let err = CallbackError::from_panic(&*payload);
        assert_eq!(
            err,
            CallbackError::Panicked {
                info: "boom".into()
            }
        );
        assert!(err.is_panic());
    }

    #[test]
    fn test_panic_payload_string() {
        let payload: Box<dyn Any + Send> = Box::new(format!("bad value {}", 7));
        let err = CallbackError::from_panic(&*payload);
        assert_eq!(err.as_message(), "panic: bad value 7");
        assert_eq!(err.as_label(), "callback_panicked");
    }

    #[test]
    fn test_panic_payload_unknown() {
        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        let err = CallbackError::from_panic(&*payload);
        assert_eq!(err.to_string(), "callback panicked: unknown panic");
    }

    #[test]
    fn test_try_next_labels() {
        assert_eq!(TryNextError::Empty.as_label(), "cursor_empty");
        assert_eq!(TryNextError::Closed.as_label(), "cursor_closed");
        assert_eq!(TryNextError::Closed.to_string(), "channel closed");
    }

    #[test]
    fn test_shutdown_error_message() {
        let err = ShutdownError::GraceExceeded {
            registry: "session_ended",
            grace: Duration::from_millis(50),
            stuck: 1,
        };
        assert_eq!(err.as_label(), "shutdown_grace_exceeded");
        assert_eq!(
            err.as_message(),
            "grace exceeded after 50ms; registry=session_ended stuck=1"
        );
    }
}
