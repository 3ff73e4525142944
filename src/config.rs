//! # Registry configuration.
//!
//! Provides [`RegistryConfig`], the settings a [`Registry`](crate::Registry) is built with.
//!
//! Config is used in two ways:
//! 1. **Registry creation**: `Registry::with_config(cfg)` / `Registry::builder(cfg)`
//! 2. **Hub defaults**: `DebugHub::new(cfg)` clones it per registry and renames each copy
//!
//! ## Sentinel values
//! - `name = ""` → reported as `"registry"` (see [`RegistryConfig::label`])
//! - `grace = 0s` → shutdown does not wait for spawned callback futures; they are aborted

use std::time::Duration;

/// Settings for a callback registry.
///
/// ## Field semantics
/// - `name`: label attached to logs and [`DispatchFailure`](crate::DispatchFailure)s
/// - `log_failures`: emit a `tracing::warn!` for every isolated callback failure
/// - `grace`: maximum wait for spawned callback futures during shutdown
///
/// ## Notes
/// Failures are always published on the registry's failure channel; `log_failures`
/// only controls the log line.
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// Registry name used in logs and failure reports.
    pub name: &'static str,

    /// Log isolated callback failures at `warn` level.
    pub log_failures: bool,

    /// Maximum time [`Registry::shutdown`](crate::Registry::shutdown) waits for
    /// callback futures still in flight.
    ///
    /// Futures still running afterwards are aborted and shutdown returns
    /// [`ShutdownError::GraceExceeded`](crate::ShutdownError::GraceExceeded).
    pub grace: Duration,
}

impl RegistryConfig {
    /// Returns a copy of this config with a different name.
    #[must_use]
    pub fn named(&self, name: &'static str) -> Self {
        Self {
            name,
            ..self.clone()
        }
    }

    /// Returns the registry label, never empty.
    #[inline]
    pub fn label(&self) -> &'static str {
        if self.name.is_empty() {
            "registry"
        } else {
            self.name
        }
    }
}

impl Default for RegistryConfig {
    /// Default configuration:
    ///
    /// - `name = "registry"`
    /// - `log_failures = true`
    /// - `grace = 10s`
    fn default() -> Self {
        Self {
            name: "registry",
            log_failures: true,
            grace: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_keeps_other_fields() {
        let base = RegistryConfig {
            name: "base",
            log_failures: false,
            grace: Duration::from_millis(250),
        };
        let renamed = base.named("messages");
        assert_eq!(renamed.name, "messages");
        assert!(!renamed.log_failures);
        assert_eq!(renamed.grace, Duration::from_millis(250));
    }

    #[test]
    fn test_empty_name_label() {
        let cfg = RegistryConfig {
            name: "",
            ..RegistryConfig::default()
        };
        assert_eq!(cfg.label(), "registry");
        assert_eq!(RegistryConfig::default().named("x").label(), "x");
    }
}
