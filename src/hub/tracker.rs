use serde_json::Value;

use super::payload::{DebugMessage, SessionEnd, SessionInfo};
use crate::registry::Registry;

/// Bridge from one debug adapter session into the hub.
///
/// Returned by [`DebugHub::track`](super::DebugHub::track); the host's adapter tracker
/// callbacks map one-to-one onto its methods.
#[derive(Debug, Clone)]
pub struct SessionTracker {
    session: SessionInfo,
    messages: Registry<DebugMessage>,
    ended: Registry<SessionEnd>,
}

impl SessionTracker {
    pub(super) fn new(
        session: SessionInfo,
        messages: Registry<DebugMessage>,
        ended: Registry<SessionEnd>,
    ) -> Self {
        Self {
            session,
            messages,
            ended,
        }
    }

    /// The tracked session.
    pub fn session(&self) -> &SessionInfo {
        &self.session
    }

    /// The adapter sent a protocol message.
    pub fn on_did_send_message(&self, message: Value) {
        self.messages.emit(DebugMessage {
            session: self.session.clone(),
            message,
        });
    }

    /// The session is about to stop.
    pub fn on_will_stop_session(&self) {
        self.ended.emit(SessionEnd {
            session: self.session.clone(),
            exit_code: None,
        });
    }

    /// The adapter process exited.
    pub fn on_exit(&self, exit_code: Option<i64>) {
        self.ended.emit(SessionEnd {
            session: self.session.clone(),
            exit_code,
        });
    }
}
