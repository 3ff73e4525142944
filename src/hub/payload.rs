//! Payloads carried by the debug hub registries.
//!
//! Protocol bodies stay opaque [`serde_json::Value`]s; only the few fields the hub
//! itself reads have accessors.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity of one debug session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Session id assigned by the host debugger.
    pub id: String,
    /// Human-readable session name.
    pub name: String,
    /// Debugger type (e.g. `"node"`, `"lldb"`).
    #[serde(rename = "type")]
    pub kind: String,
}

impl SessionInfo {
    /// Creates a session description.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// A protocol message sent by a debug adapter during a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugMessage {
    /// Session that produced the message.
    pub session: SessionInfo,
    /// Raw protocol message.
    pub message: Value,
}

impl DebugMessage {
    /// Protocol message type (`"event"`, `"response"`, `"request"`).
    pub fn message_type(&self) -> Option<&str> {
        self.message.get("type").and_then(Value::as_str)
    }

    /// Event name for `"event"` messages (e.g. `"stopped"`, `"output"`).
    pub fn event_name(&self) -> Option<&str> {
        if self.message_type() != Some("event") {
            return None;
        }
        self.message.get("event").and_then(Value::as_str)
    }

    /// Message body, if present.
    pub fn body(&self) -> Option<&Value> {
        self.message.get("body")
    }
}

/// End of a debug session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEnd {
    /// Session that ended.
    pub session: SessionInfo,
    /// Adapter exit code; `None` when the session is stopping rather than exited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i64>,
}

/// A captured runtime value to synthesize a type declaration for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferTypeRequest {
    /// Body of the debugger's `evaluate` response.
    pub evaluated: Value,
    /// Source file the declaration goes into.
    pub file_path: PathBuf,
    /// Character offset of the point of use in that file.
    pub offset: usize,
}
