//! # Failure side channel.
//!
//! Every isolated callback failure becomes a [`DispatchFailure`]: logged (if enabled)
//! and published on the registry's own [`Channel`]. Consumers read it with
//! [`Registry::failures`](crate::Registry::failures).
//!
//! ```text
//! callback Err / panic ──► FailureSink::report ──► tracing::warn!
//!                                              └─► Channel<DispatchFailure>
//! ```

use crate::chain::Channel;
use crate::error::CallbackError;

/// One isolated callback failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchFailure {
    /// Registry label ([`RegistryConfig::label`](crate::RegistryConfig::label)).
    pub registry: &'static str,
    /// Callback name ([`Callback::name`](crate::Callback::name)).
    pub callback: &'static str,
    /// Channel position of the value being handled.
    pub position: u64,
    /// What went wrong.
    pub error: CallbackError,
}

/// Reports failures for one registry; cheap to clone into spawned callback futures.
#[derive(Clone)]
pub(crate) struct FailureSink {
    registry: &'static str,
    log: bool,
    channel: Channel<DispatchFailure>,
}

impl FailureSink {
    pub(crate) fn new(registry: &'static str, log: bool) -> Self {
        Self {
            registry,
            log,
            channel: Channel::new(),
        }
    }

    pub(crate) fn channel(&self) -> &Channel<DispatchFailure> {
        &self.channel
    }

    pub(crate) fn report(&self, callback: &'static str, position: u64, error: CallbackError) {
        if self.log {
            tracing::warn!(
                registry = self.registry,
                callback,
                position,
                label = error.as_label(),
                "{}",
                error.as_message()
            );
        }
        self.channel.emit(DispatchFailure {
            registry: self.registry,
            callback,
            position,
            error,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_publishes_failure() {
        let sink = FailureSink::new("test", false);
        let mut failures = sink.channel().observe();
        sink.report("cb", 4, CallbackError::failed("nope"));

        let failure = failures.try_next().unwrap();
        assert_eq!(
            failure,
            DispatchFailure {
                registry: "test",
                callback: "cb",
                position: 4,
                error: CallbackError::failed("nope"),
            }
        );
    }
}
