//! # Debug hub: the debugger-facing event context.
//!
//! [`DebugHub`] bundles one [`Registry`] per debugger lifecycle event and per editor
//! command. Command handlers and adapter bridges receive the hub (or the registries
//! they need) explicitly; nothing here is process-global.
//!
//! ## Wiring
//! ```text
//! host adapter ──► SessionTracker ──┬─► session_created : Registry<SessionInfo>
//!                                   ├─► messages        : Registry<DebugMessage>
//!                                   └─► session_ended   : Registry<SessionEnd>
//!
//! editor command ──► infer_type_command / copy_type_command : Registry<()>
//!
//! infer_type_action : Registry<InferTypeRequest> ──forward──► infer_type_ts
//!                                                             (type synthesis handlers)
//! ```
//!
//! ## Example
//! ```rust
//! use chainbus::{DebugHub, RegistryConfig, SessionInfo};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let hub = DebugHub::new(RegistryConfig::default());
//! hub.session_ended().on_fn(|end| println!("session {} ended", end.session.id));
//!
//! let tracker = hub.track(SessionInfo::new("1", "Launch Program", "node"));
//! tracker.on_exit(Some(0));
//! hub.shutdown().await.expect("handlers finished within grace");
//! # }
//! ```

mod payload;
mod tracker;

pub use payload::{DebugMessage, InferTypeRequest, SessionEnd, SessionInfo};
pub use tracker::SessionTracker;

use crate::config::RegistryConfig;
use crate::error::ShutdownError;
use crate::registry::Registry;

/// Registries for debugger lifecycle events and editor commands.
#[derive(Debug, Clone)]
pub struct DebugHub {
    session_created: Registry<SessionInfo>,
    messages: Registry<DebugMessage>,
    session_ended: Registry<SessionEnd>,
    infer_type_command: Registry<()>,
    copy_type_command: Registry<()>,
    infer_type_action: Registry<InferTypeRequest>,
    infer_type_ts: Registry<InferTypeRequest>,
}

impl DebugHub {
    /// Creates every registry from `cfg` (renamed per registry) and wires the
    /// infer-type action into the synthesis registry.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn new(cfg: RegistryConfig) -> Self {
        let hub = Self {
            session_created: Registry::with_config(cfg.named("session_created")),
            messages: Registry::with_config(cfg.named("debug_message")),
            session_ended: Registry::with_config(cfg.named("session_ended")),
            infer_type_command: Registry::with_config(cfg.named("infer_type_command")),
            copy_type_command: Registry::with_config(cfg.named("copy_type_command")),
            infer_type_action: Registry::with_config(cfg.named("infer_type_action")),
            infer_type_ts: Registry::with_config(cfg.named("infer_type_ts")),
        };
        hub.infer_type_action.forward_to(&hub.infer_type_ts);
        tracing::debug!("debug hub wired");
        hub
    }

    /// Announces `session` and returns the bridge for its adapter callbacks.
    pub fn track(&self, session: SessionInfo) -> SessionTracker {
        tracing::debug!(session = %session.id, kind = %session.kind, "tracking debug session");
        self.session_created.emit(session.clone());
        SessionTracker::new(session, self.messages.clone(), self.session_ended.clone())
    }

    /// A debug session was created.
    pub fn session_created(&self) -> &Registry<SessionInfo> {
        &self.session_created
    }

    /// A debug adapter sent a protocol message.
    pub fn messages(&self) -> &Registry<DebugMessage> {
        &self.messages
    }

    /// A debug session stopped or its adapter exited.
    pub fn session_ended(&self) -> &Registry<SessionEnd> {
        &self.session_ended
    }

    /// The "infer type" editor command was invoked.
    pub fn infer_type_command(&self) -> &Registry<()> {
        &self.infer_type_command
    }

    /// The "copy type" editor command was invoked.
    pub fn copy_type_command(&self) -> &Registry<()> {
        &self.copy_type_command
    }

    /// A runtime value was captured for type inference.
    pub fn infer_type_action(&self) -> &Registry<InferTypeRequest> {
        &self.infer_type_action
    }

    /// Type synthesis requests; fed by [`infer_type_action`](Self::infer_type_action).
    pub fn infer_type_ts(&self) -> &Registry<InferTypeRequest> {
        &self.infer_type_ts
    }

    /// Shuts down every registry, upstream first.
    ///
    /// Safe to call from a hub callback (e.g. a `session_ended` handler).
    ///
    /// # Errors
    /// Every registry is shut down even if one of them exceeds its grace; the first
    /// [`ShutdownError`] is returned.
    pub async fn shutdown(&self) -> Result<(), ShutdownError> {
        let outcomes = [
            self.infer_type_command.shutdown().await,
            self.copy_type_command.shutdown().await,
            self.infer_type_action.shutdown().await,
            self.infer_type_ts.shutdown().await,
            self.session_created.shutdown().await,
            self.messages.shutdown().await,
            self.session_ended.shutdown().await,
        ];
        outcomes.into_iter().collect()
    }
}
